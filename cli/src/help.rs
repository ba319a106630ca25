pub const CHECK_LONG_HELP: &str = r#"Check if signature files are correct

Each file is loaded and all its signatures are compiled. Files where every
signature compiles are reported as PASS, the remaining ones as FAIL together
with the first error found.

If <SIGNATURES_PATH> is a directory, all files with extension `.toml` will be
checked."#;

pub const CONFIG_FILE: &str = r#"Config file for sigscan

Specifies a config file which controls the behavior of sigscan. If config file is not
specified, ${HOME}/.sigscan.toml is used. If it does not exist the default options are
applied.

Example:

[scan]
extensions = ["txt", "py", "sh"]
max_file_size = 16777216
max_line_length = 4096
preview_lines = 20

[signatures]
builtin = true
files = ["/etc/sigscan/signatures.toml"]"#;

pub const LIST_LONG_HELP: &str = r#"List the available signatures

Prints the name, pattern and description of every signature that would be used
by the `scan` command with the same options. Signatures that fail to compile
are reported as an error."#;

pub const OUTPUT_FORMAT_LONG_HELP: &str = r#"Output format

The format in which results will be displayed. Any errors or warnings will not
be in this format, only results.

Examples:

--output-format=text
--output-format=ndjson"#;

pub const SCAN_LONG_HELP: &str = r#"Scan a file or directory

<TARGET_PATH> can be a text file, a directory or `-` for reading from stdin.
Files are scanned line by line with every signature, and each file with one or
more matches is reported with its risk level, followed by its matches in the
form LINE:START-END:SIGNATURE: TEXT, where START and END are character offsets
within the line.

The risk level depends on the number of matches: safe (none), low (1-2),
medium (3-5), high (6-10) and critical (more than 10).

When <TARGET_PATH> is a directory only the files with one of the extensions
listed in the `scan.extensions` setting of the config file are scanned.
Extensions are compared ignoring case, so `PY` counts as `py`.

Examples:

sigscan scan script.py
sigscan scan --signatures extra.toml --recursive ./src
cat script.sh | sigscan scan -"#;

pub const SCAN_RECURSIVE_LONG_HELP: &str = r#"Scan directories recursively

When <TARGET_PATH> is a directory, this option enables recursive scanning of its contents.
An optional <MAX_DEPTH> parameter can be specified to limit the depth of the scan. If
<MAX_DEPTH> is not provided, the default maximum depth is 100.

Examples:

--recursive     (scan recursively up to a default depth of 100)
--recursive=3   (scan recursively up to a depth of 3)"#;

pub const SIGNATURES_LONG_HELP: &str = r#"Load signatures from a file

Signature files are TOML documents with one `[[signature]]` table per
signature. Each table has a name, a pattern and an optional description.

Example:

[[signature]]
name = "curl_pipe"
pattern = 'curl (-s)* http'
description = "Detects downloads piped to a shell"

Patterns support literals, `|` (union), `.` (concatenation), `*` (zero or more
repetitions) and parentheses. Notice that `.` is not a wildcard, a literal dot
must be escaped with a backslash (`\.`), as must be any other operator.

This option can be used more than once. Signature names must be unique."#;

pub const THREADS_LONG_HELP: &str = r#"Use the specified number of threads

The default value is automatically determined based on the number of CPU cores."#;
