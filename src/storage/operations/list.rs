use crate::error::Result;
use crate::storage::tree::TreeNode;
use crate::storage::utils::path::basename;

/// Trait for rendering the contents of a remote directory.
pub trait Lister {
    /// List the directory at `path`.
    ///
    /// # Arguments
    /// * `path` - Directory to list; "" and "/" are the root
    /// * `as_tree` - Draw the whole subtree instead of the immediate children
    ///
    /// # Returns
    /// * `Result<String>` - Rendered listing, or `NotFound`
    fn list(&self, path: &str, as_tree: bool) -> Result<String>;
}

impl Lister for TreeNode {
    fn list(&self, path: &str, as_tree: bool) -> Result<String> {
        if self.file_exists(path) {
            return Ok(basename(path));
        }
        let node = self.lookup_path(path)?;
        Ok(if as_tree {
            node.render()
        } else {
            node.listing()
        })
    }
}
