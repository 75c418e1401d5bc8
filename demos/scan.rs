//! Scans AIN0..AIN3 single-ended and AIN0-AIN1, AIN2-AIN3 differentially,
//! printing one line per pass and the time each mode took.
//!
//! cargo run --example scan --features rpi -- 100

use std::time::Instant;

use ads1256::rpi::{self, BusConfig};
use ads1256::{Config, DataRate, Gain, Input, Scan};
use anyhow::Context;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about = "Scan ADS1256 inputs on a Raspberry Pi")]
struct Opts {
    /// Number of passes per mode
    measurements: usize,

    /// Reference voltage; print volts instead of raw codes when given
    #[arg(long, value_name = "VOLTS")]
    vref: Option<f64>,

    #[arg(long, default_value_t = 22)]
    cs_pin: u8,

    #[arg(long, default_value_t = 17)]
    drdy_pin: u8,

    #[arg(long, default_value_t = 18)]
    rst_pin: u8,
}

fn print_pass(pass: usize, scan: &Scan, vref: Option<f64>) {
    let values: Vec<String> = match vref {
        Some(v_ref) => scan.volts(v_ref).map(|v| format!("{v:.6}")).collect(),
        None => scan.codes().map(|code| code.to_string()).collect(),
    };
    println!("{} {}", pass + 1, values.join(" "));
}

fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();

    let bus = BusConfig {
        cs_pin: opts.cs_pin,
        drdy_pin: opts.drdy_pin,
        rst_pin: opts.rst_pin,
        ..BusConfig::default()
    };
    let config = Config::default()
        .gain(Gain::Gain1)
        .data_rate(DataRate::Sps30000)
        .buffer_enabled(false);
    let mut adc = rpi::open(&bus, config).context("bringing up the ADS1256")?;
    println!("chip id: {}", adc.read_chip_identifier()?);
    println!("data rate: {} SPS", adc.data_rate().samples_per_second());

    let inputs = [Input::Ain0, Input::Ain1, Input::Ain2, Input::Ain3];
    let start = Instant::now();
    for pass in 0..opts.measurements {
        let scan = adc.scan_single_ended(&inputs)?;
        print_pass(pass, &scan, opts.vref);
    }
    let single_ended = start.elapsed();

    let pairs = [(Input::Ain0, Input::Ain1), (Input::Ain2, Input::Ain3)];
    let start = Instant::now();
    for pass in 0..opts.measurements {
        let scan = adc.scan_differential(&pairs)?;
        print_pass(pass, &scan, opts.vref);
    }
    let differential = start.elapsed();

    println!(
        "Time for {} single-ended measurements on {} channels is {} microseconds.",
        opts.measurements,
        inputs.len(),
        single_ended.as_micros()
    );
    println!(
        "Time for {} differential measurements on {} channels is {} microseconds.",
        opts.measurements,
        pairs.len(),
        differential.as_micros()
    );

    // Dropping the driver closes the SPI bus and releases the pins.
    drop(adc.release());
    Ok(())
}
