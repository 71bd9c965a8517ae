// Per-request payload limits, in bytes
const MIB: u64 = 1024 * 1024;

// Multipart part size used for object store uploads
pub const OBJECT_STORE_PART_SIZE: u64 = 100 * MIB;

// File share range writes are capped at 4 MiB per request
pub const FILE_SHARE_MAX_RANGE_WRITE: u64 = 4 * MIB;
// Files above this size are pulled in ranged pieces
pub const FILE_SHARE_MAX_RANGE_READ: u64 = 52_428_800;

// Upload session chunk for sync services
pub const SYNC_SERVICE_UPLOAD_CHUNK: u64 = 4 * MIB;

// Write size for the local filesystem backend
pub const LOCAL_WRITE_CHUNK: u64 = 64 * MIB;

// Filesystem default
pub const DEFAULT_FS_ROOT: &str = "./storage";
