//! Run the power-on self tests and report the outcome.

use hdrbg_crypto::selftest::run_self_tests;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    run_self_tests()?;
    println!("self-tests passed");
    Ok(())
}
