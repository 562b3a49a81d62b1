fn main() {
    // ESP-IDF link/env propagation is only needed for the device build;
    // host-side tests build with `--no-default-features`.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
