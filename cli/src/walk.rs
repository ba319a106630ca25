use std::fmt::Debug;
use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context};
use crossbeam::channel::{Receiver, RecvTimeoutError, SendError, Sender};
use crossterm::tty::IsTty;
use globwalk::FileType;
use superconsole::{Component, Lines, SuperConsole};

/// Walks the files in a directory, running a given function for each file.
///
/// ```text
/// let mut walker = Walker::path(Path::new("."));
///
/// walker.filter("**/*.toml").walk(
///     // This function is called for each file.
///     |file_path| {
///         // ... do something with the file
///         Ok(())
///     },
///     // This function is called with any error found during the walk.
///     |err| {
///         Ok(())
///     }
/// ).unwrap();
/// ```
pub struct Walker<'a> {
    /// Path to the directory that will be walked.
    path: &'a Path,
    /// Glob patterns. Files that don't match at least one of them are
    /// ignored.
    filters: Vec<String>,
    /// Maximum recursion depth. `None` means no limit.
    max_depth: Option<usize>,
    /// Glob patterns ignore case.
    case_insensitive: bool,
    /// Files for which this function returns `false` are ignored.
    metadata_filter: Option<Box<dyn Fn(&Metadata) -> bool + Send + 'a>>,
}

impl<'a> Walker<'a> {
    /// Creates a [`Walker`] that walks a directory.
    ///
    /// `path` can also point to an individual file instead of a directory,
    /// in that case the file is processed regardless of the filters.
    pub fn path(path: &'a Path) -> Self {
        Self {
            path,
            filters: Vec::new(),
            max_depth: None,
            case_insensitive: false,
            metadata_filter: None,
        }
    }

    /// Adds a glob pattern that controls which files will be processed.
    ///
    /// When one or more filters are added, only those files with a path that
    /// matches at least one of the filters will be processed. By default, all
    /// files are processed. `**/*.py` matches files with `.py` extension in
    /// any directory.
    pub fn filter(&mut self, filter: &str) -> &mut Self {
        self.filters.push(filter.to_string());
        self
    }

    /// Makes the glob patterns case-insensitive, so that `**/*.py` also
    /// matches `EVIL.PY`.
    pub fn case_insensitive(&mut self, yes: bool) -> &mut Self {
        self.case_insensitive = yes;
        self
    }

    /// Sets a filter based in file metadata.
    pub fn metadata_filter(
        &mut self,
        filter: impl Fn(&Metadata) -> bool + Send + 'a,
    ) -> &mut Self {
        self.metadata_filter = Some(Box::new(filter));
        self
    }

    /// Sets a maximum depth while traversing the directory tree.
    ///
    /// When the maximum depth is 0 only the files that reside in the given
    /// directory are processed.
    pub fn max_depth(&mut self, n: usize) -> &mut Self {
        self.max_depth = Some(n);
        self
    }

    /// Walks the directory, calling `f` for every file.
    ///
    /// The `e` function is called with any error that occurs during the walk,
    /// including errors returned by `f` itself. `e` must return `Ok(())` for
    /// continuing the walk or `Err` for aborting.
    pub fn walk<F, E>(self, mut f: F, mut e: E) -> anyhow::Result<()>
    where
        F: FnMut(&Path) -> anyhow::Result<()>,
        E: FnMut(anyhow::Error) -> anyhow::Result<()>,
    {
        let metadata = match self
            .path
            .metadata()
            .with_context(|| format!("can't open `{}`", self.path.display()))
        {
            Ok(metadata) => metadata,
            Err(err) => return e(err),
        };

        if metadata.is_file() {
            if self.accepts(&metadata) {
                if let Err(err) = f(self.path) {
                    return e(err);
                }
            }
            return Ok(());
        }

        // globwalk panics with paths that start with "./", except for "."
        // and "./" themselves.
        let path = if self.path.as_os_str().len() > 2 {
            self.path
                .strip_prefix(if cfg!(target_os = "windows") {
                    r#".\"#
                } else {
                    "./"
                })
                .unwrap_or(self.path)
        } else {
            self.path
        };

        let patterns: Vec<&str> = if self.filters.is_empty() {
            vec!["**"]
        } else {
            self.filters.iter().map(|f| f.as_str()).collect()
        };

        let mut builder = globwalk::GlobWalkerBuilder::from_patterns(
            path,
            patterns.as_slice(),
        )
        .case_insensitive(self.case_insensitive)
        .file_type(FileType::FILE);

        if let Some(max_depth) = self.max_depth {
            builder = builder.max_depth(max_depth + 1);
        }

        for entry in builder.build()? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    e(err.into())?;
                    continue;
                }
            };

            match entry.metadata() {
                Ok(metadata) if self.accepts(&metadata) => {
                    if let Err(err) = f(entry.path()) {
                        e(err)?
                    }
                }
                Ok(_) => {}
                Err(err) => e(err.into())?,
            }
        }

        Ok(())
    }

    fn accepts(&self, metadata: &Metadata) -> bool {
        self.metadata_filter.as_ref().map(|f| f(metadata)).unwrap_or(true)
    }
}

/// Messages sent by the worker threads of a [`ParWalker`] to the thread
/// that writes to the console.
pub enum Message {
    /// Printed to stdout.
    Info(String),
    /// Printed to stderr.
    Error(String),
    /// Stops printing messages.
    Abort,
}

/// Walks a directory like [`Walker`], but processes multiple files in
/// parallel.
///
/// The walk is done by a dedicated thread that sends the paths of the files
/// to a pool of worker threads. Each worker owns a value of some type `T`
/// created by an initialization function when the thread starts (a scanner,
/// for instance), and receives a shared state of type `S`, that is also
/// rendered in the console while the walk is in progress.
///
/// Workers must not write directly to stdout or stderr, they must send
/// [`Message`]s through the output channel instead.
///
/// ```text
/// let state = ParWalker::path(path).walk(
///     // The shared state.
///     state,
///     // Called once per thread.
///     |state, output| Scanner::new(signatures),
///     // Called for each file.
///     |state, output, file_path, scanner| {
///         scanner.scan_file(file_path)?;
///         Ok(())
///     },
///     // Called with every error, the walk aborts if it returns `Err`.
///     |err, output| Ok(()),
/// )?;
/// ```
pub struct ParWalker<'a> {
    num_threads: Option<u8>,
    walker: Walker<'a>,
}

impl<'a> ParWalker<'a> {
    /// Creates a [`ParWalker`] that walks a directory.
    ///
    /// `path` can also point to an individual file instead of a directory.
    pub fn path(path: &'a Path) -> Self {
        Self { walker: Walker::path(path), num_threads: None }
    }

    /// Sets the number of worker threads.
    ///
    /// By default, the number of threads is determined by the number of CPUs
    /// in the current host.
    pub fn num_threads(&mut self, n: u8) -> &mut Self {
        self.num_threads = Some(n);
        self
    }

    /// See [`Walker::max_depth`].
    pub fn max_depth(&mut self, n: usize) -> &mut Self {
        self.walker.max_depth(n);
        self
    }

    /// See [`Walker::filter`].
    pub fn filter(&mut self, filter: &str) -> &mut Self {
        self.walker.filter(filter);
        self
    }

    /// See [`Walker::case_insensitive`].
    pub fn case_insensitive(&mut self, yes: bool) -> &mut Self {
        self.walker.case_insensitive(yes);
        self
    }

    /// See [`Walker::metadata_filter`].
    pub fn metadata_filter(
        &mut self,
        filter: impl Fn(&Metadata) -> bool + Send + 'a,
    ) -> &mut Self {
        self.walker.metadata_filter(filter);
        self
    }

    /// Runs `action` on every file and returns the final state.
    ///
    /// See [`ParWalker`] for details.
    pub fn walk<S, T, I, A, E>(
        self,
        state: S,
        init: I,
        action: A,
        error: E,
    ) -> anyhow::Result<S>
    where
        S: Component + Debug + Send + Sync,
        I: Fn(&S, &Sender<Message>) -> T + Send + Sync + Copy,
        A: Fn(&S, &Sender<Message>, PathBuf, &mut T) -> anyhow::Result<()>
            + Send
            + Sync
            + Copy,
        E: Fn(anyhow::Error, &Sender<Message>) -> anyhow::Result<()>
            + Send
            + Sync
            + Copy,
    {
        let num_threads = match self.num_threads {
            Some(n) => n as usize,
            None => {
                thread::available_parallelism().map(usize::from).unwrap_or(8)
            }
        };

        let state = Arc::new(state);

        crossbeam::scope(|s| {
            let (paths_send, paths_recv) =
                crossbeam::channel::bounded::<PathBuf>(128);

            let (msg_send, msg_recv) =
                crossbeam::channel::unbounded::<Message>();

            for _ in 0..num_threads {
                let paths_recv = paths_recv.clone();
                let msg_send = msg_send.clone();
                let state = state.clone();
                s.spawn(move |_| {
                    let mut per_thread = init(&state, &msg_send);
                    for path in paths_recv {
                        if let Err(err) =
                            action(&state, &msg_send, path, &mut per_thread)
                        {
                            if error(err, &msg_send).is_err() {
                                let _ = msg_send.send(Message::Abort);
                                break;
                            }
                        }
                    }
                });
            }

            drop(paths_recv);

            // The walker thread owns `paths_send`, the channel is closed
            // when the walk finishes and the workers exit their loops.
            let walker_msg_send = msg_send.clone();
            s.spawn(move |_| {
                let msg_send = walker_msg_send;
                let res = self.walker.walk(
                    |file_path| Ok(paths_send.send(file_path.to_path_buf())?),
                    |err| {
                        // Workers are gone, there's nobody to send paths to.
                        if err.is::<SendError<PathBuf>>() {
                            return Err(err);
                        }
                        if let Err(err) = error(err, &msg_send) {
                            let _ = msg_send.send(Message::Abort);
                            return Err(err);
                        }
                        Ok(())
                    },
                );
                if let Err(err) = res {
                    if error(err, &msg_send).is_err() {
                        let _ = msg_send.send(Message::Abort);
                    }
                }
            });

            // Only the clones owned by the threads remain, the message
            // channel is disconnected when all of them finish.
            drop(msg_send);

            let mut console = if cfg!(feature = "logging") {
                None
            } else if io::stdout().is_tty() {
                SuperConsole::new()
            } else {
                None
            };

            output_messages(
                Duration::from_millis(150),
                msg_recv,
                console.as_mut(),
                state.as_ref(),
            );

            if let Some(console) = console {
                let _ = console.finalize(state.as_ref());
            }
        })
        .map_err(|_| anyhow!("a worker thread panicked"))?;

        Arc::try_unwrap(state)
            .map_err(|_| anyhow!("walk state is still shared after the walk"))
    }
}

/// Prints the messages received from `msg_recv` until the channel is
/// disconnected or a [`Message::Abort`] is received. If there's a console,
/// `state` is rendered once every `render_period`.
fn output_messages<S: Component>(
    render_period: Duration,
    msg_recv: Receiver<Message>,
    mut console: Option<&mut SuperConsole>,
    state: &S,
) {
    let mut last_render = Instant::now();

    loop {
        match msg_recv.recv_timeout(render_period) {
            Ok(Message::Info(s)) => match console.as_mut() {
                Some(console) => console
                    .emit(Lines::from_colored_multiline_string(s.as_str())),
                None => println!("{s}"),
            },
            Ok(Message::Error(s)) => match console.as_mut() {
                Some(console) => console
                    .emit(Lines::from_colored_multiline_string(s.as_str())),
                None => eprintln!("{s}"),
            },
            Ok(Message::Abort) | Err(RecvTimeoutError::Disconnected) => {
                break;
            }
            Err(RecvTimeoutError::Timeout) => {}
        }

        if let Some(console) = console.as_mut() {
            if last_render.elapsed() > render_period {
                let _ = console.render(state);
                last_render = Instant::now();
            }
        }
    }
}
