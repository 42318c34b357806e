use super::FilterArgs;

/// Print the search string without touching the network.
pub fn execute(filter: &FilterArgs) -> anyhow::Result<()> {
    println!("{}", filter.resolve()?);
    Ok(())
}
