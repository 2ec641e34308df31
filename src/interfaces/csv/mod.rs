pub mod scenario_reader;
pub mod telemetry_writer;
