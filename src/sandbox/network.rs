//! Ports exposed by provisioned sandboxes.

/// Well-known ports every sandbox exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SandboxPort {
    /// noVNC web client.
    Vnc,
    /// Raw VNC server.
    VncServer,
    /// Secondary VNC display.
    VncServerAlt,
    /// Chrome DevTools protocol.
    ChromeDebugging,
    /// Website served from the workspace.
    Website,
    /// In-sandbox API server.
    Api,
}

impl SandboxPort {
    /// Every exposed port, in the order they are requested at creation.
    pub const ALL: [Self; 6] = [
        Self::Vnc,
        Self::VncServer,
        Self::VncServerAlt,
        Self::ChromeDebugging,
        Self::Website,
        Self::Api,
    ];

    /// The TCP port number.
    pub fn number(self) -> u16 {
        match self {
            Self::Vnc => 6080,
            Self::VncServer => 5900,
            Self::VncServerAlt => 5901,
            Self::ChromeDebugging => 9222,
            Self::Website => 8080,
            Self::Api => 8002,
        }
    }
}

impl std::fmt::Display for SandboxPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vnc => write!(f, "vnc"),
            Self::VncServer => write!(f, "vnc-server"),
            Self::VncServerAlt => write!(f, "vnc-server-alt"),
            Self::ChromeDebugging => write!(f, "chrome-debugging"),
            Self::Website => write!(f, "website"),
            Self::Api => write!(f, "api"),
        }
    }
}

/// Port numbers requested when creating a sandbox.
pub fn exposed_ports() -> Vec<u16> {
    SandboxPort::ALL.iter().map(|p| p.number()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exposed_ports_order() {
        assert_eq!(exposed_ports(), vec![6080, 5900, 5901, 9222, 8080, 8002]);
    }

    #[test]
    fn test_port_display() {
        assert_eq!(format!("{}", SandboxPort::Vnc), "vnc");
        assert_eq!(format!("{}", SandboxPort::Website), "website");
        assert_eq!(format!("{}", SandboxPort::ChromeDebugging), "chrome-debugging");
    }
}
