fn main() -> std::process::ExitCode {
    tolling_vision_batch::run()
}
