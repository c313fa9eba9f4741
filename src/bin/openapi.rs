use anyhow::Result;

// Print the OpenAPI document as JSON.
fn main() -> Result<()> {
    let doc = tessera::tessera::openapi();
    println!("{}", doc.to_pretty_json()?);
    Ok(())
}
