//! End-to-end tests for importing an OS directory tree, then resolving the
//! includes found in the imported sources.

use std::path::Path as OsPath;

use mobius::adapter::cycles;
use mobius::filter::{And, Not, Or, RegexFilter};
use mobius::import::Importer;
use mobius::include::{self, Include};
use mobius::{Context, Directed, Fs, Graph};
use pretty_assertions::assert_eq;

fn write(root: &OsPath, rel: &str, contents: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

fn sources() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let root = dir.path();
    write(root, ".git/HEAD", "ref: refs/heads/main\n");
    write(root, "README.md", "# demo\n");
    write(root, "src/main.c", "#include \"a.h\"\nint main(void) { return 0; }\n");
    write(root, "src/a.h", "#include \"b.h\"\n");
    write(root, "src/b.h", "#include \"a.h\"\n");
    dir
}

fn c_sources() -> And<str> {
    And::new()
        .with(Not::new(RegexFilter::new(r"^\.git").unwrap()))
        .with(
            Or::<str>::new()
                .with(RegexFilter::new(r"\.c$").unwrap())
                .with(RegexFilter::new(r"\.h$").unwrap()),
        )
}

#[test]
fn test_import_with_filter() {
    let dir = sources();
    let graph = Graph::open_memory();
    let ctx = Context::background();
    let fs = Fs::new(&graph, &ctx).unwrap();

    let result = Importer::new(dir.path()).with_filter(c_sources()).import(&fs, &ctx);
    assert!(result.is_complete(), "{:?}", result.errors);
    assert_eq!(result.value, 3);

    for present in ["src", "src/main.c", "src/a.h", "src/b.h"] {
        assert!(fs.lookup(&ctx, present).unwrap().is_some(), "{present}");
    }
    for absent in [".git", ".git/HEAD", "README.md"] {
        assert!(fs.lookup(&ctx, absent).unwrap().is_none(), "{absent}");
    }
}

#[test]
fn test_imported_sources_resolve_and_cycle() {
    let dir = sources();
    let graph = Graph::open_memory();
    let ctx = Context::background();
    let fs = Fs::new(&graph, &ctx).unwrap();
    Importer::new(dir.path()).with_filter(c_sources()).import(&fs, &ctx);

    let search = include::search_path(&fs, &ctx, ["src"]).value;
    for rel in ["src/main.c", "src/a.h", "src/b.h"] {
        let text = std::fs::read_to_string(dir.path().join(rel)).unwrap();
        let resolved = include::resolve(&graph, &ctx, search.as_ref(), &Include::scan(&text));
        assert!(resolved.is_complete(), "{rel}: {:?}", resolved.errors);

        let file = fs.lookup(&ctx, rel).unwrap().unwrap();
        include::link_dependencies(&graph, &ctx, &file, &resolved.value).unwrap();
    }

    let deps = Directed::new(&graph, ctx.clone(), include::depends_rule());
    let found: Vec<Vec<String>> = cycles(&deps)
        .iter()
        .map(|cycle| {
            let mut paths: Vec<String> = cycle.iter().map(|id| fs.reverse_path(&ctx, id).unwrap()).collect();
            paths.sort();
            paths
        })
        .collect();
    assert_eq!(found, vec![vec!["src/a.h".to_string(), "src/b.h".to_string()]]);
}
