// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::runtime::{
    fail::Fail,
    network::{
        config::TcpConfig,
        consts::{
            MAX_MSS,
            MIN_MSS,
        },
    },
};
use ::std::{
    fs::File,
    io::Read,
    net::{
        Ipv4Addr,
        SocketAddrV4,
    },
    ops::Index,
    str::FromStr,
    time::Duration,
};
use ::yaml_rust::{
    Yaml,
    YamlLoader,
};

//======================================================================================================================
// Constants
//======================================================================================================================

// Global options.
mod global_config {
    pub const SECTION_NAME: &str = "minitcp";
    // Local IPv4 addr.
    pub const LOCAL_IPV4_ADDR: &str = "local_ipv4_addr";
    // Port the listener is bound to.
    pub const LOCAL_PORT: &str = "local_port";
}

// Transport options. Every key is optional and falls back to the defaults in [TcpConfig].
mod tcp_config {
    pub const SECTION_NAME: &str = "tcp_config";
    pub const MSS: &str = "mss";
    pub const RETRANSMIT_TIMEOUT_MS: &str = "retransmit_timeout_ms";
    pub const WINDOW_SIZE: &str = "window_size";
}

//======================================================================================================================
// Structures
//======================================================================================================================

/// Transport configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Yaml);

//======================================================================================================================
// Associated Functions
//======================================================================================================================

impl Config {
    /// Reads a configuration file into a [Config] object.
    pub fn new(config_path: &str) -> Result<Self, Fail> {
        let mut config_s: String = String::new();
        File::open(config_path)?.read_to_string(&mut config_s)?;
        Self::from_yaml(&config_s)
    }

    /// Parses an in-memory YAML document into a [Config] object.
    pub fn from_yaml(config_s: &str) -> Result<Self, Fail> {
        let config: Vec<Yaml> = YamlLoader::load_from_str(config_s)?;
        let config_obj: &Yaml = match &config[..] {
            [c] => c,
            _ => return Err(Fail::new(libc::EINVAL, "Wrong number of config objects")),
        };

        Ok(Self(config_obj.clone()))
    }

    fn get_global_config(&self) -> Result<&Yaml, Fail> {
        Self::get_subsection(&self.0, global_config::SECTION_NAME)
    }

    /// Global config: Reads the local IPv4 address parameter from the environment variable first and then the
    /// underlying configuration file.
    pub fn local_ipv4_addr(&self) -> Result<Ipv4Addr, Fail> {
        let local_ipv4_addr: Ipv4Addr = if let Some(addr) = Self::get_typed_env_option(global_config::LOCAL_IPV4_ADDR)?
        {
            addr
        } else {
            Self::get_typed_str_option(
                self.get_global_config()?,
                global_config::LOCAL_IPV4_ADDR,
                |val: &str| val.parse().ok(),
            )?
        };

        if local_ipv4_addr.is_unspecified() || local_ipv4_addr.is_broadcast() {
            let cause: String = format!("invalid IPv4 address (addr={:?})", local_ipv4_addr);
            error!("local_ipv4_addr(): {:?}", cause);
            return Err(Fail::new(libc::EINVAL, &cause));
        }
        Ok(local_ipv4_addr)
    }

    /// Global config: Reads the port the listener is bound to.
    pub fn local_port(&self) -> Result<u16, Fail> {
        let port: u16 = if let Some(port) = Self::get_typed_env_option(global_config::LOCAL_PORT)? {
            port
        } else {
            Self::get_int_option(self.get_global_config()?, global_config::LOCAL_PORT)?
        };

        if port == 0 {
            let cause: String = "cannot listen on port zero".to_string();
            error!("local_port(): {:?}", cause);
            return Err(Fail::new(libc::EINVAL, &cause));
        }
        Ok(port)
    }

    /// Global config: Reads the local endpoint the listener is bound to.
    pub fn local_endpoint(&self) -> Result<SocketAddrV4, Fail> {
        Ok(SocketAddrV4::new(self.local_ipv4_addr()?, self.local_port()?))
    }

    /// Reads the transport options. A missing section or a missing key leaves the default value in place.
    pub fn tcp_config(&self) -> Result<TcpConfig, Fail> {
        let section: &Yaml = self.0.index(tcp_config::SECTION_NAME);
        match section {
            Yaml::BadValue => return Ok(TcpConfig::default()),
            Yaml::Hash(_) => (),
            _ => {
                let message: String = format!("parameter \"{}\" has unexpected type", tcp_config::SECTION_NAME);
                return Err(Fail::new(libc::EINVAL, message.as_str()));
            },
        }

        let mss: Option<usize> = Self::get_optional_int_option(section, tcp_config::MSS)?;
        if let Some(mss) = mss {
            if !(MIN_MSS..=MAX_MSS).contains(&mss) {
                let message: String = format!("parameter \"{}\" is out of range (mss={:?})", tcp_config::MSS, mss);
                return Err(Fail::new(libc::ERANGE, message.as_str()));
            }
        }

        let retransmit_timeout: Option<Duration> =
            match Self::get_optional_int_option::<u64>(section, tcp_config::RETRANSMIT_TIMEOUT_MS)? {
                Some(0) => {
                    let message: String = format!("parameter \"{}\" must be positive", tcp_config::RETRANSMIT_TIMEOUT_MS);
                    return Err(Fail::new(libc::ERANGE, message.as_str()));
                },
                Some(ms) => Some(Duration::from_millis(ms)),
                None => None,
            };

        let window_size: Option<u16> = Self::get_optional_int_option(section, tcp_config::WINDOW_SIZE)?;

        Ok(TcpConfig::new(mss, retransmit_timeout, window_size))
    }

    /// Index `yaml` to find the subsection at `index`, validating that it is a hash.
    fn get_subsection<'a>(yaml: &'a Yaml, index: &str) -> Result<&'a Yaml, Fail> {
        let section: &'a Yaml = Self::get_option(yaml, index)?;
        match section {
            Yaml::Hash(_) => Ok(section),
            _ => {
                let message: String = format!("parameter \"{}\" has unexpected type", index);
                Err(Fail::new(libc::EINVAL, message.as_str()))
            },
        }
    }

    /// Index `yaml` to find the value at `index`, validating that the index exists.
    fn get_option<'a>(yaml: &'a Yaml, index: &str) -> Result<&'a Yaml, Fail> {
        match yaml.index(index) {
            Yaml::BadValue => {
                let message: String = format!("missing configuration option \"{}\"", index);
                Err(Fail::new(libc::EINVAL, message.as_str()))
            },
            value => Ok(value),
        }
    }

    /// Index `yaml` to find the value at `index`, validating that it exists and that the receiver returns Some(_).
    fn get_typed_option<'a, T, Fn>(yaml: &'a Yaml, index: &str, receiver: Fn) -> Result<T, Fail>
    where
        Fn: FnOnce(&'a Yaml) -> Option<T>,
    {
        let option: &'a Yaml = Self::get_option(yaml, index)?;
        match receiver(option) {
            Some(value) => Ok(value),
            None => {
                let message: String = format!("parameter {} has unexpected type", index);
                Err(Fail::new(libc::EINVAL, message.as_str()))
            },
        }
    }

    /// Index `yaml` to find value at `index`, validating it as a string.
    fn get_typed_str_option<T, Fn>(yaml: &Yaml, index: &str, parser: Fn) -> Result<T, Fail>
    where
        Fn: FnOnce(&str) -> Option<T>,
    {
        let option: &Yaml = Self::get_option(yaml, index)?;
        if let Some(value) = option.as_str() {
            if let Some(value) = parser(value) {
                return Ok(value);
            }
        }
        let message: String = format!("parameter {} has unexpected type", index);
        Err(Fail::new(libc::EINVAL, message.as_str()))
    }

    /// Get value where the environment value overrides the config file if it exists.
    fn get_typed_env_option<T: FromStr>(index: &str) -> Result<Option<T>, Fail> {
        // Check for the environment variable.
        if let Ok(var) = ::std::env::var(index.to_uppercase()) {
            if let Ok(value) = var.as_str().parse() {
                return Ok(Some(value));
            } else {
                let message: String = format!("parameter {} has unexpected type", index);
                return Err(Fail::new(libc::EINVAL, message.as_str()));
            }
        }
        Ok(None)
    }

    /// Similar to `get_typed_option` using `Yaml::as_i64` as the receiver, but additionally verifies that the
    /// destination type may hold the i64 value.
    fn get_int_option<T: TryFrom<i64>>(yaml: &Yaml, index: &str) -> Result<T, Fail> {
        let val: i64 = Self::get_typed_option(yaml, index, &Yaml::as_i64)?;
        match T::try_from(val) {
            Ok(val) => Ok(val),
            _ => {
                let message: String = format!("parameter \"{}\" is out of range", index);
                Err(Fail::new(libc::ERANGE, message.as_str()))
            },
        }
    }

    /// Same as `get_int_option`, but a missing key yields `None`.
    fn get_optional_int_option<T: TryFrom<i64>>(yaml: &Yaml, index: &str) -> Result<Option<T>, Fail> {
        match yaml.index(index) {
            Yaml::BadValue => Ok(None),
            _ => Ok(Some(Self::get_int_option(yaml, index)?)),
        }
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
