//! Installed shop listing.

use std::io::Write;

use xmas_events_server::db::{InstallationStore, PgInstallationStore};
use xmas_events_server::models::Installation;

use super::{CommandError, connect};

/// Print every installation as `shop<TAB>scope<TAB>installed_at`.
pub async fn list() -> Result<(), CommandError> {
    let store = PgInstallationStore::new(connect().await?);
    let installations = store.list().await?;

    let mut out = std::io::stdout().lock();
    write_table(&mut out, &installations)?;

    tracing::info!(count = installations.len(), "Listed installations");
    Ok(())
}

fn write_table(out: &mut impl Write, installations: &[Installation]) -> std::io::Result<()> {
    writeln!(out, "SHOP\tSCOPE\tINSTALLED_AT")?;
    for installation in installations {
        writeln!(
            out,
            "{}\t{}\t{}",
            installation.shop,
            installation.scope,
            installation.installed_at.to_rfc3339()
        )?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use xmas_events_core::ShopDomain;

    use super::*;

    #[test]
    fn test_write_table_omits_tokens() {
        let installations = vec![Installation {
            shop: ShopDomain::parse("sinflora.myshopify.com").unwrap(),
            access_token: SecretString::from("shpat_supersecret"),
            scope: "read_products".to_string(),
            installed_at: "2025-11-01T10:00:00Z".parse().unwrap(),
        }];

        let mut out = Vec::new();
        write_table(&mut out, &installations).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("SHOP\tSCOPE\tINSTALLED_AT\n"));
        assert!(text.contains("sinflora.myshopify.com\tread_products\t2025-11-01T10:00:00+00:00"));
        assert!(!text.contains("shpat_"));
    }
}
