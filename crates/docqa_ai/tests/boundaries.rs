use std::fs;
use std::path::{Path, PathBuf};

fn collect_rs_files(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(p) = stack.pop() {
        let entries = match fs::read_dir(&p) {
            Ok(e) => e,
            Err(_) => continue,
        };
        for ent in entries.flatten() {
            let path = ent.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().and_then(|s| s.to_str()) == Some("rs") {
                out.push(path);
            }
        }
    }
    out.sort();
    out
}

#[test]
fn grounding_never_talks_to_the_network_directly() {
    // Grounding rules must stay pure; the only model access is through the `Llm` trait.
    let src_root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("src");
    let dirs = [src_root.join("grounding"), src_root.join("retrieve")];
    let mut files = dirs.iter().flat_map(|d| collect_rs_files(d)).collect::<Vec<_>>();
    files.push(src_root.join("facts.rs"));
    files.push(src_root.join("guardrails.rs"));
    assert!(files.len() >= 4);

    for f in files {
        let text = fs::read_to_string(&f).unwrap_or_default();
        for forbidden in ["ureq::", "crate::ollama", "OllamaLlm", "OllamaEmbedder"] {
            assert!(
                !text.contains(forbidden),
                "forbidden reference `{forbidden}` found in {}",
                f.display()
            );
        }
    }
}
