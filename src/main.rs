fn main() -> Result<(), Box<dyn std::error::Error>> {
    eightd::runtime::run()
}
