use membar_env::memory::{self, AddressSpace};

fn main() {
    let start = std::time::Instant::now();
    let rss = memory::process_resident_bytes();
    let total = memory::total_physical_bytes();
    let available = memory::available_physical_bytes();
    let space = AddressSpace::detect();
    let elapsed = start.elapsed().as_micros() as u64;

    println!("Detected memory figures:");
    println!("  Process resident: {:?} bytes", rss);
    println!("  Physical total: {:?} bytes", total);
    println!("  Physical available: {:?} bytes", available);
    match space {
        Some(space) => println!(
            "  Address space: ceiling {} bytes, available {} bytes",
            space.ceiling, space.available
        ),
        None => println!("  Address space: unavailable"),
    }
    println!("Memory stats collected in {} microseconds", elapsed);
}
