use std::{borrow::Cow, io};

use crate::{Deserialize, Serialize, specs::group::GroupSpec};

type Header = u32;
const HEADER_SIZE: usize = size_of::<Header>();

const ERR_H: Header = 0;
const CONTROL_H: Header = 1;
const SLAB_H: Header = 2;
const BOUNDARY_H: Header = 3;
const HALO_H: Header = 4;
const INTERIOR_H: Header = 5;

/// The row data carried by the `Data` variant of the `Msg` enum.
///
/// Every payload is a flat row-major run of whole image rows.
#[derive(Debug)]
pub enum Payload<'a> {
    /// Coordinator to worker: the worker's rows including its halo rows.
    Slab(&'a [f32]),
    /// Worker to coordinator: the smoothed interior rows that touch a halo.
    Boundary(&'a [f32]),
    /// Coordinator to worker: the neighbours' smoothed rows for its halo.
    Halo(&'a [f32]),
    /// Worker to coordinator: the final interior rows, halo excluded.
    Interior(&'a [f32]),
}

/// The variant of a `Payload`, without its rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Slab,
    Boundary,
    Halo,
    Interior,
}

impl<'a> Payload<'a> {
    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::Slab(_) => PayloadKind::Slab,
            Payload::Boundary(_) => PayloadKind::Boundary,
            Payload::Halo(_) => PayloadKind::Halo,
            Payload::Interior(_) => PayloadKind::Interior,
        }
    }

    /// Returns the rows carried by this payload.
    pub fn rows(&self) -> &'a [f32] {
        match *self {
            Payload::Slab(rows)
            | Payload::Boundary(rows)
            | Payload::Halo(rows)
            | Payload::Interior(rows) => rows,
        }
    }
}

/// The command for the `Control` variant of the `Msg` enum.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Assign(GroupSpec),
    Barrier,
    Release,
    Topology { host: String },
    Disconnect,
}

/// The application layer message for the entire system.
#[derive(Debug)]
pub enum Msg<'a> {
    Control(Command),
    Data(Payload<'a>),
    Err(Cow<'a, str>),
}

impl Msg<'_> {
    /// A short static name of the message kind, meant for logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Msg::Control(Command::Assign(_)) => "control/assign",
            Msg::Control(Command::Barrier) => "control/barrier",
            Msg::Control(Command::Release) => "control/release",
            Msg::Control(Command::Topology { .. }) => "control/topology",
            Msg::Control(Command::Disconnect) => "control/disconnect",
            Msg::Data(Payload::Slab(_)) => "data/slab",
            Msg::Data(Payload::Boundary(_)) => "data/boundary",
            Msg::Data(Payload::Halo(_)) => "data/halo",
            Msg::Data(Payload::Interior(_)) => "data/interior",
            Msg::Err(_) => "err",
        }
    }

    fn buf_is_too_small<T>(size: usize) -> io::Result<T> {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("The given buffer is too small {size}, must at least be {HEADER_SIZE} bytes"),
        ))
    }

    fn invalid_kind<T>(kind: Header) -> io::Result<T> {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Received an invalid kind header {kind}"),
        ))
    }
}

impl<'a> Serialize<'a> for Msg<'a> {
    fn serialize(&'a self, buf: &mut Vec<u8>) -> Option<&'a [u8]> {
        match self {
            Msg::Err(e) => {
                buf.extend_from_slice(&ERR_H.to_be_bytes());
                Some(e.as_bytes())
            }
            Msg::Control(cmd) => {
                buf.extend_from_slice(&CONTROL_H.to_be_bytes());

                // SAFETY: Serialize impl for `Command` is derived and not implemented
                //         by hand. Nor has a non string-key map inside.
                serde_json::to_writer(buf, &cmd).unwrap();
                None
            }
            Msg::Data(payload) => {
                let kind = match payload.kind() {
                    PayloadKind::Slab => SLAB_H,
                    PayloadKind::Boundary => BOUNDARY_H,
                    PayloadKind::Halo => HALO_H,
                    PayloadKind::Interior => INTERIOR_H,
                };

                buf.extend_from_slice(&kind.to_be_bytes());
                Some(bytemuck::cast_slice(payload.rows()))
            }
        }
    }
}

impl<'a> Deserialize<'a> for Msg<'a> {
    fn deserialize(buf: &'a mut [u8]) -> io::Result<Self> {
        if buf.len() < HEADER_SIZE {
            return Self::buf_is_too_small(buf.len());
        }

        let (kind_buf, rest) = buf.split_at_mut(HEADER_SIZE);
        let rest: &'a [u8] = rest;

        // SAFETY: We splitted the buffer to be of size `HEADER_SIZE` just above.
        let kind = Header::from_be_bytes(kind_buf.try_into().unwrap());

        match kind {
            ERR_H => {
                let string = str::from_utf8(rest)
                    .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;

                Ok(Self::Err(Cow::Borrowed(string)))
            }
            CONTROL_H => {
                let cmd = serde_json::from_slice(rest)?;
                Ok(Self::Control(cmd))
            }
            SLAB_H..=INTERIOR_H => {
                let rows: &'a [f32] = bytemuck::try_cast_slice(rest).map_err(|e| {
                    io::Error::new(io::ErrorKind::InvalidData, format!("bad row payload: {e:?}"))
                })?;

                let payload = match kind {
                    SLAB_H => Payload::Slab(rows),
                    BOUNDARY_H => Payload::Boundary(rows),
                    HALO_H => Payload::Halo(rows),
                    _ => Payload::Interior(rows),
                };

                Ok(Self::Data(payload))
            }
            other => Self::invalid_kind(other),
        }
    }
}
