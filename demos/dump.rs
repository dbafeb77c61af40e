use klv_io::{KlvParser, TsDemuxer, DEFAULT_KLV_PID, UAS_LDS_KEY};
use std::env;
use std::fs::File;

fn main() {
    pretty_env_logger::init();
    let args = env::args();
    if args.len() < 2 {
        panic!("No file argument");
    }
    let file_path = args.skip(1).next().unwrap();

    let file = File::open(file_path).expect("unable to open!");
    let stream = TsDemuxer::new(DEFAULT_KLV_PID)
        .extract(file)
        .expect("IO Error!");
    let result = KlvParser::new(&stream, &UAS_LDS_KEY).decode();
    for packet in &result.packets {
        println!("Packet {}", packet.number);
        for (name, value) in packet.fields() {
            println!("  {}: {}", name, value);
        }
    }
}
