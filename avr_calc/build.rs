use std::env;

fn main() {
    println!("cargo:rerun-if-env-changed=F_CPU");
    println!("cargo:rerun-if-env-changed=UART_MAX_ERR_PERMILLE");

    // Default to a 16 MHz part so the crate builds without a board configured
    if let Err(_) = env::var("F_CPU") {
        println!("cargo:rustc-env=F_CPU=16000000");
    }
    // 2.5%
    if let Err(_) = env::var("UART_MAX_ERR_PERMILLE") {
        println!("cargo:rustc-env=UART_MAX_ERR_PERMILLE=25");
    }
}
