//! Document Builder - Fixed Multi-Part Container
//!
//! Serializes a resolved configuration and the provisioning script into the
//! container format the boot-time agent consumes. The byte layout is a
//! compatibility contract: header casing, boundary literal and blank-line
//! placement must not change.

use std::fmt::Write;

use crate::resolve::ResolvedConfig;

/// Boundary token used at every part delimiter and the terminal marker.
pub const BOUNDARY: &str = "==BOUNDARY==";

/// Render the two-part boot document: the vSMP section (one `key=value`
/// line per resolved entry, lexicographic key order) followed by the shell
/// script. No validation happens here.
pub fn build_document(resolved: &ResolvedConfig, script: &str) -> String {
    let mut vsmp_section = String::new();
    for (key, value) in resolved {
        // Infallible for String targets.
        let _ = writeln!(vsmp_section, "{}={}", key, value);
    }

    format!(
        "Content-Type: multipart/mixed; boundary=\"{boundary}\"\n\
         MIME-Version: 1.0\n\
         --{boundary}\n\
         Content-Type: text/x-vsmp; section=vsmp\n\
         \n\
         {vsmp_section}\
         --{boundary}\n\
         Content-Type: text/x-shellscript\n\
         \n\
         {script}\n\
         --{boundary}\n",
        boundary = BOUNDARY,
        vsmp_section = vsmp_section,
        script = script,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    #[test]
    fn test_document_layout_is_byte_exact() {
        let resolved: ResolvedConfig = BTreeMap::from([
            ("mem_topology".to_string(), "2".to_string()),
            ("system_memory".to_string(), "6x".to_string()),
        ]);

        let document = build_document(&resolved, "#!/bin/bash\necho hello");

        let expected = "Content-Type: multipart/mixed; boundary=\"==BOUNDARY==\"\n\
                        MIME-Version: 1.0\n\
                        --==BOUNDARY==\n\
                        Content-Type: text/x-vsmp; section=vsmp\n\
                        \n\
                        mem_topology=2\n\
                        system_memory=6x\n\
                        --==BOUNDARY==\n\
                        Content-Type: text/x-shellscript\n\
                        \n\
                        #!/bin/bash\n\
                        echo hello\n\
                        --==BOUNDARY==\n";

        assert_eq!(document, expected);
    }

    #[test]
    fn test_empty_resolved_config_renders_empty_section() {
        let document = build_document(&BTreeMap::new(), "script");
        assert!(document.contains("section=vsmp\n\n--==BOUNDARY==\n"));
    }

    #[test]
    fn test_keys_render_in_lexicographic_order() {
        let resolved: ResolvedConfig = BTreeMap::from([
            ("zeta".to_string(), "1".to_string()),
            ("alpha".to_string(), "2".to_string()),
        ]);

        let document = build_document(&resolved, "");
        let alpha = document.find("alpha=2").unwrap();
        let zeta = document.find("zeta=1").unwrap();
        assert!(alpha < zeta);
    }
}
