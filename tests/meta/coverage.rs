#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};

    const SRC_DIR: &str = "src";
    const UNIT_DIR: &str = "tests/unit";
    const TESTS_DIR: &str = "tests";

    /// Rust files and directories under `root`, relative to it
    fn module_tree(root: &Path) -> io::Result<BTreeSet<PathBuf>> {
        let mut found = BTreeSet::new();
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            for entry in fs::read_dir(&dir)? {
                let path = entry?.path();
                let Ok(relative) = path.strip_prefix(root) else {
                    continue;
                };
                if path.is_dir() {
                    found.insert(relative.to_path_buf());
                    pending.push(path);
                } else if path.extension().is_some_and(|ext| ext == "rs") {
                    found.insert(relative.to_path_buf());
                }
            }
        }

        Ok(found)
    }

    // Crate roots and module declaration files hold no logic to mirror
    fn is_declaration_file(relative: &Path) -> bool {
        relative.file_name().is_some_and(|name| name == "mod.rs")
            || relative == Path::new("main.rs")
            || relative == Path::new("lib.rs")
    }

    // Files whose `mod x;` resolves to `<dir>/x.rs`; others resolve into `<dir>/<stem>/`
    fn owns_directory(file: &Path) -> bool {
        file.file_name()
            .is_some_and(|name| name == "mod.rs" || name == "main.rs" || name == "lib.rs")
    }

    fn declared_modules(file: &Path) -> io::Result<Vec<String>> {
        let content = fs::read_to_string(file)?;
        Ok(content
            .lines()
            .map(str::trim)
            .filter_map(|line| {
                let line = line.strip_prefix("pub ").unwrap_or(line);
                line.strip_prefix("mod ")?.strip_suffix(';')
            })
            .map(|name| name.trim().to_string())
            .collect())
    }

    /// Files reachable from `root` following `mod` declarations, plus
    /// declarations that resolve to no file
    fn reachable_files(root: &Path) -> io::Result<(BTreeSet<PathBuf>, Vec<String>)> {
        let mut reached = BTreeSet::new();
        let mut unresolved = Vec::new();
        let mut pending = vec![root.to_path_buf()];

        while let Some(file) = pending.pop() {
            if !reached.insert(file.clone()) {
                continue;
            }
            let Some(parent) = file.parent() else {
                continue;
            };
            let module_dir = if owns_directory(&file) {
                parent.to_path_buf()
            } else {
                let stem = file.file_stem().unwrap_or_default();
                parent.join(stem)
            };

            for name in declared_modules(&file)? {
                let flat = module_dir.join(format!("{name}.rs"));
                let nested = module_dir.join(&name).join("mod.rs");
                match (flat.is_file(), nested.is_file()) {
                    (true, false) => pending.push(flat),
                    (false, true) => pending.push(nested),
                    (true, true) => unresolved.push(format!(
                        "  - {}: `mod {name};` is ambiguous",
                        file.display()
                    )),
                    (false, false) => unresolved.push(format!(
                        "  - {}: `mod {name};` has no file",
                        file.display()
                    )),
                }
            }
        }

        Ok((reached, unresolved))
    }

    #[test]
    fn test_every_source_module_has_unit_tests() {
        let src = module_tree(Path::new(SRC_DIR)).expect("src is readable");
        let unit = module_tree(Path::new(UNIT_DIR)).unwrap_or_default();

        let missing: Vec<String> = src
            .iter()
            .filter(|path| !is_declaration_file(path) && !unit.contains(*path))
            .map(|path| format!("  - src/{0} -> {UNIT_DIR}/{0}", path.display()))
            .collect();

        assert!(
            missing.is_empty(),
            "Source modules without unit tests:\n{}",
            missing.join("\n")
        );
    }

    #[test]
    fn test_every_unit_test_has_source_module() {
        let src = module_tree(Path::new(SRC_DIR)).expect("src is readable");
        let unit = module_tree(Path::new(UNIT_DIR)).unwrap_or_default();

        let orphaned: Vec<String> = unit
            .iter()
            .filter(|path| !is_declaration_file(path) && !src.contains(*path))
            .map(|path| format!("  - {UNIT_DIR}/{}", path.display()))
            .collect();

        assert!(
            orphaned.is_empty(),
            "Unit tests without a source module:\n{}",
            orphaned.join("\n")
        );
    }

    // Tests every file of a directory test target is compiled into it
    // Verified by declaring a unit module under the wrong name
    #[test]
    fn test_test_targets_compile_every_file() {
        let mut problems = Vec::new();

        for entry in fs::read_dir(TESTS_DIR).expect("tests is readable") {
            let target = entry.expect("readable entry").path();
            let root = target.join("main.rs");
            if !root.is_file() {
                continue;
            }

            let (reached, unresolved) = reachable_files(&root).expect("target is readable");
            problems.extend(unresolved);

            let files = module_tree(&target).expect("target is readable");
            problems.extend(
                files
                    .iter()
                    .map(|relative| target.join(relative))
                    .filter(|path| path.is_file() && !reached.contains(path))
                    .map(|path| format!("  - {} is never compiled", path.display())),
            );
        }

        assert!(
            problems.is_empty(),
            "Test target wiring problems:\n{}",
            problems.join("\n")
        );
    }

    #[test]
    fn test_every_test_file_has_tests() {
        let tests_dir = Path::new(TESTS_DIR);
        let files = module_tree(tests_dir).expect("tests is readable");

        let empty: Vec<String> = files
            .iter()
            .map(|relative| tests_dir.join(relative))
            .filter(|path| path.is_file())
            .filter(|path| {
                let is_target_root = path.file_name().is_some_and(|name| name == "main.rs")
                    && path.parent().and_then(Path::parent) == Some(tests_dir);
                let is_module_list = path.file_name().is_some_and(|name| name == "mod.rs");
                !is_target_root && !is_module_list
            })
            .filter(|path| {
                fs::read_to_string(path).is_ok_and(|content| !content.contains("#[test]"))
            })
            .map(|path| format!("  - {}", path.display()))
            .collect();

        assert!(
            empty.is_empty(),
            "Test files without any #[test] function:\n{}",
            empty.join("\n")
        );
    }
}
