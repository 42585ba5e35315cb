//! `did-cli presentation`: create and check verifiable presentations.

use clap::Subcommand;

use hdid_abi::Token;
use hdid_ledger::LedgerClient;

use super::{bool_field, executed, yes_no, HolderHashArgs, PayloadArgs};
use crate::reporter::Summary;

#[derive(Subcommand, Debug)]
pub enum PresentationCommand {
    /// Create a new presentation.
    Create(PayloadArgs),
    /// Get presentation information.
    Get(HolderHashArgs),
    /// Verify a presentation.
    Verify(HolderHashArgs),
}

impl PresentationCommand {
    pub fn labels(&self) -> (&'static str, &'static str) {
        match self {
            Self::Create(_) => ("Creating presentation", "Failed to create presentation"),
            Self::Get(_) => ("Getting presentation information", "Failed to get presentation"),
            Self::Verify(_) => ("Verifying presentation", "Failed to verify presentation"),
        }
    }
}

pub async fn run(command: &PresentationCommand, client: &LedgerClient) -> anyhow::Result<Summary> {
    match command {
        PresentationCommand::Create(payload) => {
            let hash = payload.digest()?;
            let outcome = client
                .execute(
                    "createPresentation",
                    &[Token::FixedBytes(hash.as_bytes().to_vec())],
                )
                .await?;
            Ok(executed("Presentation created successfully!", outcome)
                .field("Presentation hash", hash))
        }
        PresentationCommand::Get(target) => {
            let result = client.query("getPresentation", &target.tokens()?).await?;
            Ok(Summary::positive("Presentation information:")
                .field("Valid", yes_no(bool_field(&result, 0)?)))
        }
        PresentationCommand::Verify(target) => {
            let result = client.query("verifyPresentation", &target.tokens()?).await?;
            if bool_field(&result, 0)? {
                Ok(Summary::positive("Presentation is valid"))
            } else {
                Ok(Summary::warning("Presentation is not valid"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing;
    use hdid_abi::{codec, ParamType};
    use hdid_core::digest;

    #[tokio::test]
    async fn test_create_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vp.json");
        std::fs::write(&path, r#"{"holder":"0.0.1234","proof":[1,2]}"#).unwrap();

        let (client, recorder) = testing::client(vec![]);
        let command = PresentationCommand::Create(PayloadArgs {
            data: None,
            file: Some(path),
        });
        let summary = run(&command, &client).await.unwrap();

        let expected = digest::digest_json_str(r#"{"holder":"0.0.1234","proof":[1,2]}"#).unwrap();
        assert_eq!(summary.get("Presentation hash"), Some(expected.to_hex().as_str()));
        assert_eq!(&recorder.last().data.as_bytes()[4..], expected.as_bytes());
    }

    #[tokio::test]
    async fn test_get_reports_validity() {
        let raw = codec::encode(&[ParamType::Bool], &[Token::Bool(true)]).unwrap();
        let (client, recorder) = testing::client(raw);
        let command = PresentationCommand::Get(HolderHashArgs {
            holder: "0x0000000000000000000000000000000000000a11".into(),
            hash: format!("0x{}", "ab".repeat(32)),
        });
        let summary = run(&command, &client).await.unwrap();
        assert_eq!(summary.get("Valid"), Some("Yes"));
        assert_eq!(recorder.functions(), vec!["getPresentation"]);
    }
}
