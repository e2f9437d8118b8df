/// Options for opening a stack file.
///
/// # Examples
///
/// ```rust
/// use hyperstack::stack::OpenOptions;
///
/// // Create with defaults
/// let options = OpenOptions::default();
///
/// // Or customize
/// let options = OpenOptions::new()
///     .with_password("open sesame")
///     .with_encryption_hack(false)
///     .with_checksum_verification(true);
/// ```
#[derive(Debug, Clone)]
pub struct OpenOptions {
    /// Password of a private stack
    pub password: Option<String>,
    /// Whether to recover the header key of a private stack without password
    pub hack_encryption: bool,
    /// Whether to check the stack header, list and page checksums
    pub verify_checksums: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            password: None,
            hack_encryption: true,
            verify_checksums: true,
        }
    }
}

impl OpenOptions {
    /// Create a new `OpenOptions` with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the password used to decrypt a private stack header.
    ///
    /// Case and accents of the password are ignored.
    #[inline]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set whether a private stack may be opened without its password.
    ///
    /// When enabled, the header key is searched by brute force before the
    /// password is asked for.
    #[inline]
    pub fn with_encryption_hack(mut self, hack: bool) -> Self {
        self.hack_encryption = hack;
        self
    }

    /// Set whether checksums are verified.
    ///
    /// A bad header checksum makes the open fail; bad list or page checksums
    /// are only logged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hyperstack::stack::OpenOptions;
    ///
    /// let options = OpenOptions::new().with_checksum_verification(false);
    /// assert!(!options.verify_checksums);
    /// ```
    #[inline]
    pub fn with_checksum_verification(mut self, verify: bool) -> Self {
        self.verify_checksums = verify;
        self
    }
}
