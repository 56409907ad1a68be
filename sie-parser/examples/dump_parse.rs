use flexi_logger::Logger;
use sie_parser::SieReader;

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let filename = std::env::args().nth(1).ok_or("filename argument")?;
    let _logger = Logger::try_with_env_or_str("info")?.start()?;
    let bytes = std::fs::read(&filename)?;

    let mut reader = SieReader::new();
    let document = reader.read_bytes(&bytes, &filename);
    dbg!(document);
    for error in reader.errors() {
        println!("Error: {}", error);
    }
    for warning in reader.warnings() {
        println!("Warning: {}", warning);
    }
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        println!("Error: {}", e);
    }
}
