use crate::error::{NotchError, Result};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_PUBLIC_DIR: &str = "public";

/// Writable locations tried, in order, on hosts that only mount temp paths.
pub const RESTRICTED_DATA_DIRS: [&str; 2] = ["/var/tmp/data", "/tmp/data"];

pub const INDEX_HTML: &str = "index.html";
pub const ORDER_HTML: &str = "order.html";
pub const ADMIN_HTML: &str = "admin.html";

const ORDER_EXT: &str = "json";

// ---------------------------------------------------------------------------
// Order keys
// ---------------------------------------------------------------------------

/// Derive the storage key for an order number by dropping every character
/// outside `[A-Za-z0-9_-]`.
pub fn order_key(order_no: &str) -> Result<String> {
    let key: String = order_no
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    if key.is_empty() {
        return Err(NotchError::Validation(format!(
            "invalid order number '{order_no}': must contain letters, digits, '_' or '-'"
        )));
    }
    Ok(key)
}

pub fn order_path(data_dir: &Path, key: &str) -> PathBuf {
    data_dir.join(format!("{key}.{ORDER_EXT}"))
}

pub fn page_path(public_dir: &Path, page: &str) -> PathBuf {
    public_dir.join(page)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_keeps_safe_characters() {
        for order_no in ["TEST123", "a-b_c", "2024-0001"] {
            assert_eq!(order_key(order_no).unwrap(), order_no);
        }
    }

    #[test]
    fn key_strips_unsafe_characters() {
        assert_eq!(order_key("../etc/passwd").unwrap(), "etcpasswd");
        assert_eq!(order_key("AB 12/3").unwrap(), "AB123");
        assert_eq!(order_key("sipariş-7").unwrap(), "sipari-7");
    }

    #[test]
    fn key_rejects_nothing_left() {
        for order_no in ["", "   ", "../", "şğü"] {
            let err = order_key(order_no).unwrap_err();
            assert!(matches!(err, NotchError::Validation(_)), "{order_no}");
        }
    }

    #[test]
    fn path_helpers() {
        let dir = Path::new("/srv/data");
        assert_eq!(order_path(dir, "TEST123"), PathBuf::from("/srv/data/TEST123.json"));
        assert_eq!(
            page_path(Path::new("/srv/public"), ADMIN_HTML),
            PathBuf::from("/srv/public/admin.html")
        );
    }
}
