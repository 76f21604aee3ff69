use std::{env, fs, path::PathBuf};

#[path = "src/sdk_header.rs"]
mod sdk_header;

const SDK_DIR_ENV: &str = "BLACKMAGIC_RAW_SDK_DIR";
const API_DIR_ENV: &str = "BLACKMAGIC_RAW_API_DIR";
const HEADER: &str = "BlackmagicRawAPI.h";

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let sdk_root = env::var_os(SDK_DIR_ENV).map(PathBuf::from);
    let api_dir = env::var_os(API_DIR_ENV).map(PathBuf::from);

    let mut candidates = Vec::new();
    if let Some(root) = &sdk_root {
        candidates.extend([
            root.clone(),
            root.join("Include"),
            root.join("Linux").join("Include"),
            root.join("Mac").join("Include"),
        ]);
    }
    if let Some(dir) = &api_dir {
        // Libraries and Include sit side by side in the SDK.
        if let Some(parent) = dir.parent() {
            candidates.push(parent.join("Include"));
        }
    }
    candidates.extend([
        PathBuf::from("/usr/lib64/blackmagic/BlackmagicRAWSDK/Linux/Include"),
        PathBuf::from("/usr/lib/blackmagic/BlackmagicRAWSDK/Linux/Include"),
        PathBuf::from("/opt/blackmagic/BlackmagicRAWSDK/Linux/Include"),
        PathBuf::from("/Applications/Blackmagic RAW/Blackmagic RAW SDK/Mac/Include"),
    ]);

    let header = candidates
        .iter()
        .map(|dir| dir.join(HEADER))
        .find(|path| path.is_file());

    let source = match &header {
        Some(path) => {
            let text = fs::read_to_string(path)
                .unwrap_or_else(|err| panic!("unable to read {}: {err}", path.display()));
            let parsed = sdk_header::parse_iids(&text);
            let mut iids = Vec::new();
            let mut missing = Vec::new();
            for name in sdk_header::INTERFACES {
                match parsed.iter().find(|(found, _)| found == name) {
                    Some((_, bytes)) => iids.push((name, *bytes)),
                    None => missing.push(name),
                }
            }
            if !missing.is_empty() {
                panic!("{} does not define IID_{}", path.display(), missing.join(", IID_"));
            }
            println!("cargo:rerun-if-changed={}", path.display());
            sdk_header::render(&iids, Some(&path.display().to_string()))
        }
        None => {
            println!(
                "cargo:warning={HEADER} not found; set {SDK_DIR_ENV} to the SDK directory. Factories cannot be created by this build"
            );
            sdk_header::render(&sdk_header::unresolved(), None)
        }
    };
    fs::write(out_dir.join("interface_ids.rs"), source).expect("unable to write interface_ids.rs");

    println!("cargo:rerun-if-changed=src/sdk_header.rs");
    println!("cargo:rerun-if-env-changed={SDK_DIR_ENV}");
    println!("cargo:rerun-if-env-changed={API_DIR_ENV}");
}
