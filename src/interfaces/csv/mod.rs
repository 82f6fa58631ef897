pub mod report_writer;
pub mod scenario_reader;
