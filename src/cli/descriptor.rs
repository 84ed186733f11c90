//! Descriptor command implementation.

use crate::config::CallConfig;
use crate::foreground::{ForegroundNotification, ForegroundOptions};
use anyhow::Result;
use clap::Args;

/// Arguments for the descriptor command
#[derive(Args)]
pub struct DescriptorArgs {
    /// Meeting code shown in the notification
    #[arg(short, long)]
    pub room_id: Option<String>,
}

/// Run the descriptor command
pub fn run(args: DescriptorArgs, config: &CallConfig) -> Result<()> {
    println!("{}", render(&args, config)?);
    Ok(())
}

fn render(args: &DescriptorArgs, config: &CallConfig) -> Result<String> {
    let options = ForegroundOptions {
        room_id: args.room_id.clone(),
    };
    let notification = ForegroundNotification::build(Some(&options), &config.foreground);
    Ok(notification.to_json()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_descriptor() -> Result<()> {
        let args = DescriptorArgs {
            room_id: Some("ABCD".to_string()),
        };
        let json: serde_json::Value = serde_json::from_str(&render(&args, &CallConfig::default())?)?;
        assert_eq!(json["message"], "Meeting code: ABCD");
        assert_eq!(json["color"], "#F95F4A");
        Ok(())
    }
}
