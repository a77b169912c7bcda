use crate::error::ShellError;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Flags {
    flags: HashMap<String, Flag>,
}

#[derive(Debug, Clone)]
pub struct Flag {
    pub short: String,
    pub long: String,
    pub description: String,
    /// Flags taking an argument hold it here; switches hold "true".
    pub value: Option<String>,
    pub takes_value: bool,
}

impl Flag {
    fn new(short: &str, long: &str, description: &str, takes_value: bool) -> Self {
        Self {
            short: short.to_string(),
            long: long.to_string(),
            description: description.to_string(),
            value: None,
            takes_value,
        }
    }

    fn matches(&self, arg: &str) -> bool {
        arg == self.short || arg == self.long
    }
}

impl Default for Flags {
    fn default() -> Self {
        Self::new()
    }
}

impl Flags {
    pub fn new() -> Self {
        let flags = [
            ("help", Flag::new("-h", "--help", "Print this help message", false)),
            ("version", Flag::new("-v", "--version", "Show version information", false)),
            ("config", Flag::new("-c", "--config", "Run this file instead of ~/.veinrc", true)),
            ("quiet", Flag::new("-q", "--quiet", "Suppress warnings and hints", false)),
            ("debug", Flag::new("-d", "--debug", "Enable debug logging", false)),
        ]
        .into_iter()
        .map(|(name, flag)| (name.to_string(), flag))
        .collect();

        Flags { flags }
    }

    pub fn parse(&mut self, args: &[String]) -> Result<(), ShellError> {
        let mut args = args.iter();
        while let Some(arg) = args.next() {
            let flag = self
                .flags
                .values_mut()
                .find(|flag| flag.matches(arg))
                .ok_or_else(|| ShellError::FlagError(format!("Unknown option: {}", arg)))?;

            if flag.takes_value {
                let value = args.next().ok_or_else(|| {
                    ShellError::FlagError(format!("Flag {} requires a value", arg))
                })?;
                flag.value = Some(value.clone());
            } else {
                flag.value = Some("true".to_string());
            }
        }
        Ok(())
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.flags
            .get(name)
            .and_then(|f| f.value.as_ref())
            .is_some()
    }

    pub fn get_value(&self, name: &str) -> Option<&String> {
        self.flags.get(name).and_then(|f| f.value.as_ref())
    }

    pub fn help(&self) -> String {
        let mut flags: Vec<&Flag> = self.flags.values().collect();
        flags.sort_by(|a, b| a.short.cmp(&b.short));

        let mut help = String::from("Usage: vein [OPTIONS]\n\nOptions:\n");
        for flag in flags {
            let long = if flag.takes_value {
                format!("{} <path>", flag.long)
            } else {
                flag.long.clone()
            };
            help.push_str(&format!("  {}, {:<17} {}\n", flag.short, long, flag.description));
        }
        help
    }

    pub fn print_help(&self) {
        print!("{}", self.help());
    }
}
