fn main() {
    std::process::exit(macocr_lib::run())
}
