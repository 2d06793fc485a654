use crate::constants::tables;
use crate::state::SharedState;

pub fn cmd_tables(state: &SharedState) -> anyhow::Result<()> {
    println!("Data directory: {}", state.tables.root().display());
    println!();
    println!("{:<36}  {:>10}", "Table", "Rows");
    println!("{:-<48}", "");

    let mut missing = 0;
    for name in tables::ALL {
        let rows = match state.tables.load(name) {
            Ok(df) => df.height().to_string(),
            Err(crate::store::TableError::NotFound(_)) => {
                missing += 1;
                "missing".to_string()
            }
            Err(e) => format!("error: {e}"),
        };
        println!("{name:<36}  {rows:>10}");
    }

    if missing > 0 {
        println!();
        println!("{missing} table(s) missing. Pages that read them will show an error.");
    }

    Ok(())
}
