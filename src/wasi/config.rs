use crate::wasi::capture::{CAPTURE_LIMIT, CapturePipe};
use crate::{cstr_to_bytes, update_last_error};
use anyhow::{Context, Result, anyhow, bail};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use std::os::raw::c_char;
use std::path::PathBuf;
use wasmtime_wasi::preview1::WasiP1Ctx;
use wasmtime_wasi::{DirPerms, FilePerms, WasiCtxBuilder};

/// A host directory exposed to the guest.
#[derive(Debug)]
struct Preopen {
    host: PathBuf,
    guest: String,
}

/// Builder for a guest's OS facade.
#[derive(Default)]
pub struct wasi_config_t {
    args: Vec<Vec<u8>>,
    env: Vec<(Vec<u8>, Vec<u8>)>,
    preopens: Vec<Preopen>,
    /// Directories that `wasi_config_preopen_dir`/`wasi_config_mapdir`
    /// refused. Building an environment from this config will fail.
    rejected: Vec<String>,
    inherit_stdin: bool,
    inherit_stdout: bool,
    inherit_stderr: bool,
}

/// What `wasi_config_t::build` hands to the environment.
pub(crate) struct BuiltContext {
    pub(crate) ctx: WasiP1Ctx,
    pub(crate) stdout: Option<CapturePipe>,
    pub(crate) stderr: Option<CapturePipe>,
}

impl wasi_config_t {
    pub(crate) fn new(program_name: Vec<u8>) -> wasi_config_t {
        wasi_config_t {
            args: vec![program_name],
            ..wasi_config_t::default()
        }
    }

    pub(crate) fn arg(&mut self, arg: Vec<u8>) {
        self.args.push(arg);
    }

    /// Sets `key`, replacing any previous value but keeping its position.
    pub(crate) fn set_env(&mut self, key: Vec<u8>, value: Vec<u8>) {
        match self.env.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.env.push((key, value)),
        }
    }

    /// Registers `host` for the guest under `guest`.
    ///
    /// The directory must be openable right now. A directory that isn't is
    /// remembered so that the config can no longer produce an environment.
    pub(crate) fn add_dir(&mut self, host: &[u8], guest: &[u8]) -> Result<()> {
        let described = String::from_utf8_lossy(host).into_owned();
        match Self::check_dir(host, guest) {
            Ok(preopen) => {
                log::debug!("preopening `{}` as `{}`", described, preopen.guest);
                self.preopens.push(preopen);
                Ok(())
            }
            Err(e) => {
                self.rejected.push(described);
                Err(e)
            }
        }
    }

    fn check_dir(host: &[u8], guest: &[u8]) -> Result<Preopen> {
        let host = std::str::from_utf8(host).context("directory path is not valid UTF-8")?;
        let guest = std::str::from_utf8(guest).context("guest path is not valid UTF-8")?;
        Dir::open_ambient_dir(host, ambient_authority())
            .with_context(|| format!("failed to open directory `{host}`"))?;
        Ok(Preopen {
            host: PathBuf::from(host),
            guest: guest.to_owned(),
        })
    }

    pub(crate) fn build(self) -> Result<BuiltContext> {
        if let Some(dir) = self.rejected.first() {
            bail!("directory `{dir}` could not be opened when it was added to the config");
        }

        let mut builder = WasiCtxBuilder::new();

        let args = self
            .args
            .into_iter()
            .enumerate()
            .map(|(i, bytes)| {
                String::from_utf8(bytes).with_context(|| format!("argument #{i} is not valid UTF-8"))
            })
            .collect::<Result<Vec<String>>>()?;
        builder.args(&args);

        for (key, value) in self.env {
            let key = String::from_utf8(key)
                .map_err(|e| anyhow!(e).context("environment variable name is not valid UTF-8"))?;
            let value = String::from_utf8(value).with_context(|| {
                format!("value of environment variable `{key}` is not valid UTF-8")
            })?;
            builder.env(&key, &value);
        }

        if self.inherit_stdin {
            builder.inherit_stdin();
        }
        let stdout = if self.inherit_stdout {
            builder.inherit_stdout();
            None
        } else {
            let pipe = CapturePipe::new(CAPTURE_LIMIT);
            builder.stdout(pipe.clone());
            Some(pipe)
        };
        let stderr = if self.inherit_stderr {
            builder.inherit_stderr();
            None
        } else {
            let pipe = CapturePipe::new(CAPTURE_LIMIT);
            builder.stderr(pipe.clone());
            Some(pipe)
        };

        for Preopen { host, guest } in self.preopens {
            builder
                .preopened_dir(&host, &guest, DirPerms::all(), FilePerms::all())
                .with_context(|| format!("failed to preopen `{}`", host.display()))?;
        }

        Ok(BuiltContext {
            ctx: builder.build_p1(),
            stdout,
            stderr,
        })
    }
}

/// Creates a config whose first argument is `program_name`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn wasi_config_new(program_name: *const c_char) -> Option<Box<wasi_config_t>> {
    match unsafe { cstr_to_bytes(program_name) } {
        Some(name) => Some(Box::new(wasi_config_t::new(name))),
        None => {
            update_last_error("program name must not be null");
            None
        }
    }
}

wasmbed_c_api_macros::declare_own!(wasi_config_t);

#[unsafe(no_mangle)]
pub unsafe extern "C" fn wasi_config_arg(config: &mut wasi_config_t, arg: *const c_char) {
    if let Some(arg) = unsafe { cstr_to_bytes(arg) } {
        config.arg(arg);
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn wasi_config_env(
    config: &mut wasi_config_t,
    key: *const c_char,
    value: *const c_char,
) {
    let key = unsafe { cstr_to_bytes(key) };
    let value = unsafe { cstr_to_bytes(value) };
    if let (Some(key), Some(value)) = (key, value) {
        config.set_env(key, value);
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn wasi_config_inherit_stdin(config: &mut wasi_config_t) {
    config.inherit_stdin = true;
}

#[unsafe(no_mangle)]
pub extern "C" fn wasi_config_inherit_stdout(config: &mut wasi_config_t) {
    config.inherit_stdout = true;
}

#[unsafe(no_mangle)]
pub extern "C" fn wasi_config_inherit_stderr(config: &mut wasi_config_t) {
    config.inherit_stderr = true;
}

/// Exposes `dir` to the guest under the same path.
///
/// Returns `false` and records the last error if `dir` can't be opened.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn wasi_config_preopen_dir(
    config: &mut wasi_config_t,
    dir: *const c_char,
) -> bool {
    let Some(dir) = (unsafe { cstr_to_bytes(dir) }) else {
        update_last_error("directory path must not be null");
        return false;
    };
    match config.add_dir(&dir, &dir) {
        Ok(()) => true,
        Err(e) => {
            update_last_error(e);
            false
        }
    }
}

/// Exposes `dir` to the guest under `alias`.
///
/// Returns `false` and records the last error if `dir` can't be opened.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn wasi_config_mapdir(
    config: &mut wasi_config_t,
    alias: *const c_char,
    dir: *const c_char,
) -> bool {
    let alias = unsafe { cstr_to_bytes(alias) };
    let dir = unsafe { cstr_to_bytes(dir) };
    let (Some(alias), Some(dir)) = (alias, dir) else {
        update_last_error("alias and directory path must not be null");
        return false;
    };
    match config.add_dir(&dir, &alias) {
        Ok(()) => true,
        Err(e) => {
            update_last_error(e);
            false
        }
    }
}
