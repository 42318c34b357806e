use anyhow::Result;

use crate::cargo;

/// `(package, features)`; an empty feature list means `--no-default-features`.
const FEATURE_COMBINATIONS: &[(&str, &[&str])] = &[
    ("mailsweep-common", &[]),
    ("mailsweep-common", &["observability"]),
    ("mailsweep-core", &["test-utils"]),
];

/// Check that every listed package/feature combination compiles.
pub fn check_feature_matrix() -> Result<()> {
    let total = FEATURE_COMBINATIONS.len();
    println!("Checking {total} feature combinations...");

    for (index, (package, features)) in FEATURE_COMBINATIONS.iter().enumerate() {
        let joined = features.join(",");
        let mut args = vec!["check", "-p", *package];
        if features.is_empty() {
            args.push("--no-default-features");
        } else {
            args.extend(["--no-default-features", "--features", joined.as_str()]);
        }

        println!("\n[{}/{total}] cargo {}", index + 1, args.join(" "));
        cargo(&args, &format!("{package} failed to compile with features [{joined}]"))?;
    }

    println!("\n✅ All {total} feature combinations compile successfully!");
    Ok(())
}
