use std::{env, fs, path::Path};

// Place config.json next to the built binary so the server finds it at startup.
fn main() {
    let out_dir = env::var("OUT_DIR").expect("Cannot read OUT_DIR");

    // OUT_DIR = target/<profile>/build/<crate>/out; three levels up is target/<profile>
    let exe_dir = Path::new(&out_dir)
        .ancestors()
        .nth(3)
        .expect("Cannot find executable directory");

    let src = Path::new("config.json");
    let dst = exe_dir.join("config.json");

    if let Err(e) = fs::copy(src, &dst) {
        println!("cargo:warning=Could NOT copy config.json: {}", e);
    }

    println!("cargo:rerun-if-changed=config.json");
}
