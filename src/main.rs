fn main() -> std::process::ExitCode {
    testforge_lib::run()
}
