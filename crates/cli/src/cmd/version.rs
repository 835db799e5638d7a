use anyhow::Result;

use podbin_lib::consts::{APP_NAME, VERSION};

use crate::output::{OutputFormat, print_json};

pub fn cmd_version(output: OutputFormat) -> Result<()> {
  if output.is_json() {
    print_json(&serde_json::json!({ "name": APP_NAME, "version": VERSION }))?;
  } else {
    println!("{} {}", APP_NAME, VERSION);
  }
  Ok(())
}
