fn main() {
    println!("cargo:rerun-if-changed=Info.plist");
    println!("cargo:rerun-if-changed=Info.ios.plist");
    tauri_build::build()
}
