//! Initialize licenser.toml configuration

use anyhow::Result;
use licenser_core::config::CONFIG_FILENAME;
use licenser_core::LicenserConfig;
use std::path::Path;

pub fn run(path: Option<&Path>) -> Result<()> {
    let target_path = path.unwrap_or_else(|| Path::new("."));
    let config_path = target_path.join(CONFIG_FILENAME);

    if config_path.exists() {
        println!("⚠️  {CONFIG_FILENAME} already exists at {:?}", config_path);
        return Ok(());
    }

    template(target_path).save(&config_path)?;

    println!("✅ Created {CONFIG_FILENAME} at {:?}", config_path);
    println!("\nFill in product.hash, remote.api_url and site.url, then run:");
    println!("  licenser activate <KEY>");

    Ok(())
}

/// Default config with the product named after the directory.
pub fn template(dir: &Path) -> LicenserConfig {
    let mut config = LicenserConfig::default();
    let name = dir
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_default();
    config.product.slug = slugify(&name);
    config.product.name = name;
    config
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Acme Forms  Pro"), "acme-forms-pro");
        assert_eq!(slugify("__acme__"), "acme");
        assert_eq!(slugify(""), "");
    }
}
