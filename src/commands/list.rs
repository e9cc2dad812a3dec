use anyhow::Result;
use lilyponddist::{LilypondDist, Settings};
use prettytable::{Table, format, row};

/// Prints the catalog as a table, marking installed versions and the
/// versions available for this host.
pub fn run(settings: &Settings) -> Result<()> {
    let dist = LilypondDist::from_settings(settings);
    let installer = dist.installer();
    let catalog = installer.catalog();
    let host = installer.host();
    let latest = catalog.latest();

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(row!["Version", "Platforms", "This host", "Installed"]);
    for (version, platforms) in catalog.all_versions() {
        let names: Vec<String> = platforms.iter().map(|p| p.to_string()).collect();
        let label = if version == latest {
            format!("{version} (latest)")
        } else {
            version.to_string()
        };
        let available = if platforms.contains(host) { "yes" } else { "no" };
        let installed = if dist.is_installed(Some(version)) { "yes" } else { "" };
        table.add_row(row![label, names.join(", "), available, installed]);
    }
    table.printstd();
    Ok(())
}
