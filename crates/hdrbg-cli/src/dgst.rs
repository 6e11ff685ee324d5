//! SHA-256 digest command implementation.

use std::fs;
use std::io::{self, Read};

use hdrbg_crypto::sha2::Sha256;

pub fn run(file: &str) -> Result<(), Box<dyn std::error::Error>> {
    let data = if file == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        buf
    } else {
        fs::read(file)?
    };

    let name = if file == "-" { "stdin" } else { file };
    println!("SHA256({name})= {}", digest_hex(&data));
    Ok(())
}

fn digest_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
