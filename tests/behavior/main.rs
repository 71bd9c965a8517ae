use libtest_mimic::Arguments;

mod operations;

pub use utils::*;

fn main() {
    let args = Arguments::from_args();

    let mut tests = Vec::new();

    operations::list::tests(&mut tests);
    operations::push::tests(&mut tests);
    operations::pull::tests(&mut tests);
    operations::delete::tests(&mut tests);
    operations::mkdir::tests(&mut tests);
    operations::usage::tests(&mut tests);
    operations::factory::tests(&mut tests);
    operations::cli::tests(&mut tests);

    let _ = tracing_subscriber::fmt()
        .pretty()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    libtest_mimic::run(&args, tests).exit()
}
