#[cfg(test)]
pub mod test {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::path::Path;
    use std::thread::{self, JoinHandle};

    use confique::Config;
    use serde_yaml::{Mapping, Value};

    use crate::document::Document;
    use crate::encrypt::Encryptor;
    use crate::endpoint::{ProbeOutcome, ReachabilityProbe};
    use crate::error::{EncfigError, EncryptionFailureKind};
    use crate::repo::{Lookup, VersionControl};
    use crate::settings::Settings;
    use crate::store::DocumentStore;
    use crate::types::RepoSlug;

    /// Parse a YAML literal into a document.
    pub fn doc(yaml: &str) -> Document {
        Document::parse(yaml).unwrap()
    }

    /// `{secure: <ciphertext>}`
    pub fn secure(ciphertext: &str) -> Value {
        let mut mapping = Mapping::new();
        mapping.insert("secure".into(), ciphertext.into());
        Value::Mapping(mapping)
    }

    /// Compiled-in defaults only: no files, no environment.
    pub fn settings() -> Settings {
        Settings::builder().load().unwrap()
    }

    #[test]
    fn settings_fixture_uses_defaults() {
        let s = settings();
        assert_eq!(s.document.file_name, ".travis.yml");
        assert_eq!(s.git.default_remote, "origin");
    }

    // -- Version control -------------------------------------------------------

    /// In-memory git state. Every query counts towards [`FakeVcs::calls`].
    #[derive(Debug, Default)]
    pub struct FakeVcs {
        branch: Option<String>,
        tracking: HashMap<String, String>,
        remotes: HashMap<String, String>,
        calls: Cell<usize>,
    }

    impl FakeVcs {
        pub fn branch(mut self, branch: &str) -> Self {
            self.branch = Some(branch.into());
            self
        }

        pub fn tracking(mut self, branch: &str, remote: &str) -> Self {
            self.tracking.insert(branch.into(), remote.into());
            self
        }

        pub fn remote(mut self, name: &str, url: &str) -> Self {
            self.remotes.insert(name.into(), url.into());
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.get()
        }

        fn answer(&self, value: Option<&String>) -> Lookup {
            self.calls.set(self.calls.get() + 1);
            match value {
                Some(v) => Lookup::Found(v.clone()),
                None => Lookup::Unavailable,
            }
        }
    }

    impl VersionControl for FakeVcs {
        fn current_branch(&self) -> Lookup {
            self.answer(self.branch.as_ref())
        }

        fn branch_remote(&self, branch: &str) -> Lookup {
            self.answer(self.tracking.get(branch))
        }

        fn remote_url(&self, remote: &str) -> Lookup {
            self.answer(self.remotes.get(remote))
        }
    }

    // -- Reachability probe ----------------------------------------------------

    #[derive(Debug, Clone, Copy)]
    enum ProbeBehavior {
        Reachable,
        Unavailable,
        Failing,
    }

    #[derive(Debug)]
    pub struct FakeProbe {
        behavior: ProbeBehavior,
        calls: Cell<usize>,
    }

    impl FakeProbe {
        fn with(behavior: ProbeBehavior) -> Self {
            Self {
                behavior,
                calls: Cell::new(0),
            }
        }

        pub fn reachable() -> Self {
            Self::with(ProbeBehavior::Reachable)
        }

        /// The API answers with an error status.
        pub fn unavailable() -> Self {
            Self::with(ProbeBehavior::Unavailable)
        }

        /// No API answer at all.
        pub fn failing() -> Self {
            Self::with(ProbeBehavior::Failing)
        }

        pub fn calls(&self) -> usize {
            self.calls.get()
        }
    }

    impl ReachabilityProbe for FakeProbe {
        fn head_repository(&self, slug: &RepoSlug) -> Result<ProbeOutcome, EncfigError> {
            self.calls.set(self.calls.get() + 1);
            match self.behavior {
                ProbeBehavior::Reachable => Ok(ProbeOutcome::Reachable),
                ProbeBehavior::Unavailable => Ok(ProbeOutcome::Unavailable),
                ProbeBehavior::Failing => Err(EncfigError::ProbeFailed {
                    slug: slug.to_string(),
                    reason: "connection refused".into(),
                }),
            }
        }
    }

    // -- Document store --------------------------------------------------------

    /// A document held in memory, counting loads and persists.
    #[derive(Debug)]
    pub struct MemoryStore {
        doc: RefCell<Document>,
        loads: Cell<usize>,
        persists: Cell<usize>,
    }

    impl MemoryStore {
        pub fn new(doc: Document) -> Self {
            Self {
                doc: RefCell::new(doc),
                loads: Cell::new(0),
                persists: Cell::new(0),
            }
        }

        pub fn loads(&self) -> usize {
            self.loads.get()
        }

        pub fn persists(&self) -> usize {
            self.persists.get()
        }

        pub fn current(&self) -> Document {
            self.doc.borrow().clone()
        }
    }

    impl DocumentStore for MemoryStore {
        fn location(&self) -> &Path {
            Path::new("memory.yml")
        }

        fn load(&self) -> Result<Document, EncfigError> {
            self.loads.set(self.loads.get() + 1);
            Ok(self.current())
        }

        fn persist(&self, doc: &Document) -> Result<(), EncfigError> {
            self.persists.set(self.persists.get() + 1);
            *self.doc.borrow_mut() = doc.clone();
            Ok(())
        }
    }

    // -- Encryptor -------------------------------------------------------------

    /// Wraps plaintext as `enc(<plaintext>)`; refuses [`FakeEncryptor::DENIED`].
    #[derive(Debug, Clone, Copy)]
    pub struct FakeEncryptor;

    impl FakeEncryptor {
        pub const DENIED: &'static str = "forbidden";
    }

    impl Encryptor for FakeEncryptor {
        fn encrypt(&self, plaintext: &str) -> Result<String, EncfigError> {
            if plaintext == Self::DENIED {
                return Err(EncfigError::EncryptionFailed {
                    kind: EncryptionFailureKind::AccessDenied,
                    reason: "no access to repository key".into(),
                });
            }
            Ok(format!("enc({plaintext})"))
        }
    }

    // -- Local HTTP --------------------------------------------------------------

    /// Answer exactly one request on a local port with an empty `status`
    /// response. Returns the base URL and a handle yielding the request head.
    pub fn serve_once(status: u16) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut head = String::new();
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                    break;
                }
                head.push_str(&line);
            }
            let reason = match status {
                200 => "OK",
                404 => "Not Found",
                _ => "Error",
            };
            write!(
                stream,
                "HTTP/1.1 {status} {reason}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
            )
            .unwrap();
            stream.flush().unwrap();
            head
        });
        (url, handle)
    }

    /// A local URL nothing listens on.
    pub fn closed_port_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }
}
