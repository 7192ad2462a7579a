//! End to end builds over in-memory sources

use confargs::handler::{CallSite, Directive, HandlerResult};
use confargs::source::{MemorySources, Source, SourceError, SourceProvider};
use confargs::{build_command_line, entries, BuildConfig, BuildError, Entry};
use pretty_assertions::assert_eq;

fn include_handler(argument: &str, _site: &CallSite) -> HandlerResult {
    Ok(Directive::Include(argument.to_string()))
}

fn build(sources: &MemorySources, entries: &[Entry]) -> Result<Vec<String>, BuildError> {
    build_command_line("main.conf", None, entries, "app", sources).map(|args| args.into_vec())
}

fn build_with_includes(
    sources: &MemorySources,
    entries: &[Entry],
) -> Result<Vec<String>, BuildError> {
    let mut handler = include_handler;
    let config = BuildConfig::default().with_handler(&mut handler);
    build_command_line("main.conf", Some(config), entries, "app", sources)
        .map(|args| args.into_vec())
}

#[test]
fn name_and_gated_bell() {
    let entries = entries! {
        "Name (<any*>)" => "--name=$0",
        "Bell? <bool>" => "--bell",
    };
    let sources = MemorySources::default().with("main.conf", "Name Johnny Doe\nBell no\n");

    assert_eq!(
        build(&sources, &entries).unwrap(),
        vec!["app", "--name=Johnny Doe"]
    );

    let sources = MemorySources::default().with("main.conf", "Name Johnny Doe\nBell YES\n");
    assert_eq!(
        build(&sources, &entries).unwrap(),
        vec!["app", "--name=Johnny Doe", "--bell"]
    );
}

#[test]
fn capture_around_literal() {
    let entries = entries! { "WidthAndHeight (<digits>x<digits>)" => "--size=$0" };
    let sources = MemorySources::default().with("main.conf", "WidthAndHeight 10x20");
    assert_eq!(build(&sources, &entries).unwrap(), vec!["app", "--size=10x20"]);
}

#[test]
fn two_captures() {
    let entries = entries! { "Size width:(<digits>) height:(<digits>)" => "--size=$0x$1" };
    let sources = MemorySources::default().with("main.conf", "Size width:10 height:20");
    assert_eq!(build(&sources, &entries).unwrap(), vec!["app", "--size=10x20"]);
}

#[test]
fn include_inserts_in_place() {
    let entries = entries! {
        "Name (<any*>)" => "--name=$0",
        "!Include <any*>" => "$*",
    };
    let sources = MemorySources::default()
        .with("main.conf", "Name first\nInclude other.conf\nName last\n")
        .with("other.conf", "Name nested-1\nName nested-2\n");

    assert_eq!(
        build_with_includes(&sources, &entries).unwrap(),
        vec![
            "app",
            "--name=first",
            "--name=nested-1",
            "--name=nested-2",
            "--name=last"
        ]
    );
}

#[test]
fn unknown_properties() {
    let entries = entries! { "Name (<any*>)" => "--name=$0" };
    let sources = MemorySources::default().with("main.conf", "Colour blue\nName x\n");

    assert_eq!(build(&sources, &entries).unwrap(), vec!["app", "--name=x"]);

    let config = BuildConfig::default().strict(true);
    let error = build_command_line("main.conf", Some(config), &entries, "app", &sources)
        .unwrap_err();
    match error {
        BuildError::UnrecognizedDirective {
            source_id,
            line,
            text,
        } => {
            assert_eq!(source_id, "main.conf");
            assert_eq!(line, 1);
            assert_eq!(text, "Colour blue");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn closed_gate_is_not_unrecognized() {
    let entries = entries! { "Bell? <bool>" => "--bell" };
    let sources = MemorySources::default().with("main.conf", "Bell off");
    let config = BuildConfig::default().strict(true);
    let args = build_command_line("main.conf", Some(config), &entries, "app", &sources).unwrap();
    assert_eq!(args.into_vec(), vec!["app"]);
}

#[test]
fn builds_are_repeatable() {
    let entries = entries! {
        "Name (<any*>)" => "--name=$0",
        "Size width:(<digits>) height:(<digits>)" => "--size=$0x$1",
    };
    let sources = MemorySources::default().with(
        "main.conf",
        "# settings\nname: Johnny\nsize width:1 height:2\n",
    );

    assert_eq!(
        build(&sources, &entries).unwrap(),
        build(&sources, &entries).unwrap()
    );
}

#[test]
fn extra_whitespace_does_not_change_the_result() {
    let entries = entries! { "Size width:(<digits>) height:(<digits>)" => "--size=$0x$1" };
    let tight = MemorySources::default().with("main.conf", "Size width:10 height:20");
    let loose = MemorySources::default().with("main.conf", "  Size \t width:10  \t  height:20  ");

    assert_eq!(
        build(&tight, &entries).unwrap(),
        build(&loose, &entries).unwrap()
    );
}

#[test]
fn handler_can_skip_lines() {
    let entries = entries! {
        "Name (<any*>)" => "--name=$0",
        "!Profile <alnum>" => "$*",
    };
    let sources =
        MemorySources::default().with("main.conf", "Profile dev\nName x\nProfile prod\n");

    let mut profiles = vec![];
    let mut handler = |argument: &str, _: &CallSite| -> HandlerResult {
        profiles.push(argument.to_string());
        Ok(Directive::Next)
    };
    let config = BuildConfig::default().with_handler(&mut handler);
    let args = build_command_line("main.conf", Some(config), &entries, "app", &sources).unwrap();

    assert_eq!(args.into_vec(), vec!["app", "--name=x"]);
    assert_eq!(profiles, vec!["dev", "prod"]);
}

#[test]
fn handler_errors_abort_the_build() {
    let entries = entries! {
        "Name (<any*>)" => "--name=$0",
        "!Include <any*>" => "$*",
    };
    let sources = MemorySources::default()
        .with("main.conf", "Name x\nInclude other.conf\n")
        .with("other.conf", "Name y\nInclude /etc/passwd\n");

    let mut handler = |argument: &str, _: &CallSite| -> HandlerResult {
        if argument.starts_with('/') {
            return Err("absolute includes are not allowed".into());
        }
        Ok(Directive::Include(argument.to_string()))
    };
    let config = BuildConfig::default().with_handler(&mut handler);
    let error = build_command_line("main.conf", Some(config), &entries, "app", &sources)
        .unwrap_err();

    match error {
        BuildError::Handler {
            source_id,
            line,
            source,
        } => {
            assert_eq!(source_id, "other.conf");
            assert_eq!(line, 2);
            assert_eq!(source.to_string(), "absolute includes are not allowed");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn handler_sees_the_call_site() {
    let entries = entries! { "!Include <any*>" => "$*" };
    let sources = MemorySources::default().with("main.conf", "\n# c\ninclude: x.conf\n");

    let mut sites = vec![];
    let mut handler = |_: &str, site: &CallSite| -> HandlerResult {
        sites.push(site.clone());
        Ok(Directive::Next)
    };
    let config = BuildConfig::default().with_handler(&mut handler);
    build_command_line("main.conf", Some(config), &entries, "app", &sources).unwrap();

    assert_eq!(
        sites,
        vec![CallSite::new("Include".into(), "main.conf".into(), 3)]
    );
}

#[test]
fn include_cycles_are_detected() {
    let entries = entries! { "!Include <any*>" => "$*" };
    let sources = MemorySources::default()
        .with("main.conf", "Include a.conf\n")
        .with("a.conf", "Include b.conf\n")
        .with("b.conf", "Include main.conf\n");

    match build_with_includes(&sources, &entries).unwrap_err() {
        BuildError::IncludeCycle {
            source_id,
            line,
            included,
        } => {
            assert_eq!(source_id, "b.conf");
            assert_eq!(line, 1);
            assert_eq!(included, "main.conf");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn same_source_may_be_included_twice() {
    let entries = entries! {
        "Name (<any*>)" => "--name=$0",
        "!Include <any*>" => "$*",
    };
    let sources = MemorySources::default()
        .with("main.conf", "Include common.conf\nInclude common.conf\n")
        .with("common.conf", "Name shared\n");

    assert_eq!(
        build_with_includes(&sources, &entries).unwrap(),
        vec!["app", "--name=shared", "--name=shared"]
    );
}

#[test]
fn include_depth_is_bounded() {
    let entries = entries! { "!Include <any*>" => "$*" };
    let sources = MemorySources::default()
        .with("main.conf", "Include 1.conf\n")
        .with("1.conf", "Include 2.conf\n")
        .with("2.conf", "Include 3.conf\n")
        .with("3.conf", "\n");

    let mut handler = include_handler;
    let config = BuildConfig::default()
        .max_include_depth(2)
        .with_handler(&mut handler);
    let error = build_command_line("main.conf", Some(config), &entries, "app", &sources)
        .unwrap_err();

    assert!(matches!(
        error,
        BuildError::IncludeTooDeep { limit: 2, ref reference, .. } if reference == "3.conf"
    ));

    let mut handler = include_handler;
    let config = BuildConfig::default()
        .max_include_depth(3)
        .with_handler(&mut handler);
    assert!(build_command_line("main.conf", Some(config), &entries, "app", &sources).is_ok());
}

#[test]
fn missing_include() {
    let entries = entries! { "!Include <any*>" => "$*" };
    let sources = MemorySources::default().with("main.conf", "Include gone.conf\n");

    assert!(matches!(
        build_with_includes(&sources, &entries).unwrap_err(),
        BuildError::Source(confargs::source::SourceError::NotFound(name)) if name == "gone.conf"
    ));
}

#[test]
fn quoted_values() {
    let entries = entries! {
        "Title (<any>)" => "--title=$0",
        "Pair (<any>) (<any>)" => "--pair=$0,$1",
    };
    let sources = MemorySources::default().with(
        "main.conf",
        "Title \"Hello # World\"  # comment\nPair 'a b' c\n",
    );

    assert_eq!(
        build(&sources, &entries).unwrap(),
        vec!["app", "--title=Hello # World", "--pair=a b,c"]
    );
}

#[test]
fn apostrophes_do_not_hide_comments() {
    let entries = entries! { "Name (<any*>)" => "--name=$0" };
    let sources = MemorySources::default()
        .with("main.conf", "Name O'Brien # surname\nName 'unclosed # oops\n");

    assert_eq!(
        build(&sources, &entries).unwrap(),
        vec!["app", "--name=O'Brien", "--name='unclosed"]
    );
}

#[test]
fn whitespace_between_tokens_does_not_change_the_result() {
    let entries = entries! {
        "Size width:(<digits>) height:(<digits>)" => "--size=$0x$1",
        "WidthAndHeight (<digits>x<digits>)" => "--wh=$0",
    };
    let tight = MemorySources::default()
        .with("main.conf", "Size width:10 height:20\nWidthAndHeight 10x20\n");
    let loose = MemorySources::default()
        .with("main.conf", "Size width: 10 height:\t20\nWidthAndHeight 10x 20\n");

    let expected = vec!["app", "--size=10x20", "--wh=10x20"];
    assert_eq!(build(&tight, &entries).unwrap(), expected);

    let config = BuildConfig::default().strict(true);
    let args = build_command_line("main.conf", Some(config), &entries, "app", &loose).unwrap();
    assert_eq!(args.into_vec(), vec!["app", "--size=10x20", "--wh=10x 20"]);
}

/// serves raw bytes, which need not be valid text
struct RawSources(&'static [u8]);

impl SourceProvider for RawSources {
    fn open(&self, reference: &str, _parent: Option<&str>) -> Result<Source, SourceError> {
        Ok(Source {
            id: reference.to_string(),
            reader: Box::new(self.0),
        })
    }
}

#[test]
fn invalid_text_is_a_read_error() {
    let entries = entries! { "Name (<any*>)" => "--name=$0" };
    let sources = RawSources(b"Name x\nName \xff\xfe\n");

    match build_command_line("main.conf", None, &entries, "app", &sources).unwrap_err() {
        BuildError::Source(SourceError::Read { id, source }) => {
            assert_eq!(id, "main.conf");
            assert_eq!(source.kind(), std::io::ErrorKind::InvalidData);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

/// a reader that fails on first use
struct Broken;

impl std::io::Read for Broken {
    fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
        Err(std::io::Error::other("device gone"))
    }
}

impl SourceProvider for Broken {
    fn open(&self, reference: &str, _parent: Option<&str>) -> Result<Source, SourceError> {
        Ok(Source {
            id: reference.to_string(),
            reader: Box::new(std::io::BufReader::new(Broken)),
        })
    }
}

#[test]
fn reader_failures_are_read_errors() {
    let entries = entries! { "Name (<any*>)" => "--name=$0" };
    let error = build_command_line("main.conf", None, &entries, "app", &Broken).unwrap_err();
    assert!(matches!(
        error,
        BuildError::Source(SourceError::Read { ref id, .. }) if id == "main.conf"
    ));
}
