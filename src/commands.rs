pub mod registers {
    use std::path::PathBuf;

    use crate::registers::{DataType, RegisterIndex};

    #[derive(clap::ValueEnum, Clone, Debug)]
    pub enum Format {
        Table,
        Json,
    }

    /// Search and output the known ABC registers.
    #[derive(clap::Parser)]
    pub struct Args {
        #[arg(long, short='f', value_enum, default_value_t = Format::Table)]
        format: Format,
        filter: Option<String>,
        #[arg(long, short = 'o')]
        file: Option<PathBuf>,
    }

    #[derive(thiserror::Error, Debug)]
    pub enum Error {
        #[error("could not open the specified output file at {1:?}")]
        OpenOutputFile(#[source] std::io::Error, PathBuf),
        #[error("could not write data to the output file at {1:?}")]
        WriteFile(#[source] std::io::Error, PathBuf),
        #[error("could not write data to the terminal")]
        WriteStdout(#[source] std::io::Error),
        #[error("could not serialize registers to JSON")]
        SerializeJson(#[source] serde_json::Error),
    }

    #[derive(serde::Serialize)]
    pub struct RegisterSchema {
        pub address: u16,
        pub name: &'static str,
        #[serde(rename = "type")]
        pub data_type: Option<DataType>,
        pub words: usize,
        pub unit: Option<&'static str>,
        pub valid: bool,
        pub description: &'static str,
    }

    impl RegisterSchema {
        pub fn all_registers() -> impl Iterator<Item = Self> {
            RegisterIndex::all().map(|register| RegisterSchema {
                address: register.address(),
                name: register.name(),
                data_type: register.data_type(),
                words: register.word_count(),
                unit: register.unit(),
                valid: crate::ranges::is_valid(register.address()),
                description: register.description(),
            })
        }

        pub fn is_match(&self, pattern: &str) -> bool {
            let pattern = pattern.to_uppercase();
            if self.name.to_uppercase().contains(&pattern) {
                return true;
            }
            if self.description.to_uppercase().contains(&pattern) {
                return true;
            }
            self.address.to_string().contains(&pattern)
        }
    }

    pub fn run(args: Args) -> Result<(), Error> {
        let mut output_writer: Box<dyn std::io::Write> = match &args.file {
            None => Box::new(std::io::stdout().lock()) as Box<_>,
            Some(path) => Box::new(
                std::fs::OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(path)
                    .map_err(|e| Error::OpenOutputFile(e, path.clone()))?,
            ) as Box<_>,
        };

        let registers = RegisterSchema::all_registers().filter(|register| {
            args.filter
                .as_deref()
                .is_none_or(|pattern| register.is_match(pattern))
        });
        let data = match args.format {
            Format::Table => {
                let mut table = comfy_table::Table::new();
                table
                    .set_header(vec![
                        "Address",
                        "Name",
                        "Type",
                        "Words",
                        "Unit",
                        "Valid",
                        "Description",
                    ])
                    .set_content_arrangement(comfy_table::ContentArrangement::Dynamic);
                let mut matched = 0usize;
                for register in registers {
                    matched += 1;
                    table.add_row(vec![
                        register.address.to_string(),
                        register.name.to_string(),
                        register
                            .data_type
                            .map(|dt| dt.to_string())
                            .unwrap_or_else(|| "raw".to_string()),
                        register.words.to_string(),
                        register.unit.unwrap_or_default().to_string(),
                        if register.valid { "yes" } else { "no" }.to_string(),
                        register.description.to_string(),
                    ]);
                }
                tracing::debug!(matched, "rendered register table");
                table.to_string().into_bytes()
            }
            Format::Json => {
                let value = registers.collect::<Vec<_>>();
                serde_json::to_vec(&value).map_err(Error::SerializeJson)?
            }
        };
        output_writer.write_all(&data).map_err(|e| match args.file {
            None => Error::WriteStdout(e),
            Some(p) => Error::WriteFile(e, p),
        })?;
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn schema_covers_the_whole_catalog() {
            assert_eq!(
                RegisterSchema::all_registers().count(),
                crate::registers::ADDRESSES.len(),
            );
        }

        #[test]
        fn filtering_matches_names_case_insensitively() {
            let schema = RegisterSchema::all_registers()
                .find(|r| r.address == 92)
                .unwrap();
            assert!(schema.is_match("model"));
            assert!(schema.is_match("92"));
            assert!(!schema.is_match("dealer"));
        }
    }
}

pub mod ranges {
    use std::path::PathBuf;

    use crate::ranges::{ReadCommand, VALID_RANGES, plan_reads};

    #[derive(clap::ValueEnum, Clone, Debug)]
    pub enum Format {
        Table,
        Json,
    }

    /// Output the address ranges the ABC answers for, or a batched read plan
    /// covering the register catalog.
    #[derive(clap::Parser)]
    pub struct Args {
        /// Output coalesced read commands instead of the raw ranges.
        #[arg(long)]
        plan: bool,
        #[arg(long, short='f', value_enum, default_value_t = Format::Table)]
        format: Format,
        #[arg(long, short = 'o')]
        file: Option<PathBuf>,
    }

    #[derive(thiserror::Error, Debug)]
    pub enum Error {
        #[error("could not open the specified output file at {1:?}")]
        OpenOutputFile(#[source] std::io::Error, PathBuf),
        #[error("could not write data to the output file at {1:?}")]
        WriteFile(#[source] std::io::Error, PathBuf),
        #[error("could not write data to the terminal")]
        WriteStdout(#[source] std::io::Error),
        #[error("could not serialize ranges to JSON")]
        SerializeJson(#[source] serde_json::Error),
    }

    pub fn run(args: Args) -> Result<(), Error> {
        let mut output_writer: Box<dyn std::io::Write> = match &args.file {
            None => Box::new(std::io::stdout().lock()) as Box<_>,
            Some(path) => Box::new(
                std::fs::OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(path)
                    .map_err(|e| Error::OpenOutputFile(e, path.clone()))?,
            ) as Box<_>,
        };

        let plan: Vec<ReadCommand>;
        let data = match (&args.format, args.plan) {
            (Format::Table, false) => {
                let mut table = comfy_table::Table::new();
                table
                    .set_header(vec!["Start", "End", "Registers"])
                    .set_content_arrangement(comfy_table::ContentArrangement::Dynamic);
                for range in VALID_RANGES {
                    table.add_row(vec![
                        range.start.to_string(),
                        range.end.to_string(),
                        range.register_count().to_string(),
                    ]);
                }
                table.to_string().into_bytes()
            }
            (Format::Table, true) => {
                plan = plan_reads();
                tracing::debug!(requests = plan.len(), "planned catalog read-out");
                let mut table = comfy_table::Table::new();
                table
                    .set_header(vec!["Address", "Count"])
                    .set_content_arrangement(comfy_table::ContentArrangement::Dynamic);
                for command in &plan {
                    table.add_row(vec![
                        command.address.to_string(),
                        command.count.to_string(),
                    ]);
                }
                table.to_string().into_bytes()
            }
            (Format::Json, false) => {
                serde_json::to_vec(VALID_RANGES).map_err(Error::SerializeJson)?
            }
            (Format::Json, true) => {
                serde_json::to_vec(&plan_reads()).map_err(Error::SerializeJson)?
            }
        };
        output_writer.write_all(&data).map_err(|e| match args.file {
            None => Error::WriteStdout(e),
            Some(p) => Error::WriteFile(e, p),
        })?;
        Ok(())
    }
}

pub mod decode {
    use std::io::Write as _;

    #[derive(clap::ValueEnum, Clone, Debug)]
    pub enum Format {
        Plain,
        Json,
    }

    /// Decode raw register words as read from the ABC.
    #[derive(clap::Parser)]
    pub struct Args {
        /// Holding register address the words were read from.
        address: u16,
        /// The raw 16-bit words, decimal or 0x-prefixed hexadecimal.
        #[arg(required = true, value_parser = parse_word)]
        words: Vec<u16>,
        #[arg(long, short='f', value_enum, default_value_t = Format::Plain)]
        format: Format,
    }

    #[derive(thiserror::Error, Debug)]
    pub enum Error {
        #[error("could not decode the supplied register words")]
        Decode(#[source] crate::decode::Error),
        #[error("could not serialize the decoded value to JSON")]
        SerializeJson(#[source] serde_json::Error),
        #[error("could not write data to the terminal")]
        WriteStdout(#[source] std::io::Error),
    }

    fn parse_word(input: &str) -> Result<u16, std::num::ParseIntError> {
        match input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
            Some(hex) => u16::from_str_radix(hex, 16),
            None => input.parse(),
        }
    }

    pub fn run(args: Args) -> Result<(), Error> {
        let decoded = crate::decode::decode(args.address, &args.words).map_err(Error::Decode)?;
        let mut stdout = std::io::stdout().lock();
        match args.format {
            Format::Plain => {
                writeln!(stdout, "{}: {decoded}", decoded.address).map_err(Error::WriteStdout)?;
            }
            Format::Json => {
                serde_json::to_writer(&mut stdout, &decoded).map_err(Error::SerializeJson)?;
                writeln!(stdout).map_err(Error::WriteStdout)?;
            }
        }
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn words_parse_in_both_bases() {
            assert_eq!(parse_word("485").unwrap(), 485);
            assert_eq!(parse_word("0x8000").unwrap(), 0x8000);
            assert_eq!(parse_word("0XFFFF").unwrap(), 0xFFFF);
            assert!(parse_word("65536").is_err());
            assert!(parse_word("words").is_err());
        }
    }
}
