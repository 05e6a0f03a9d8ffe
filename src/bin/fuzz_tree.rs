//! AFL fuzz harness for the tree buffer.
//!
//! Decodes the input into a stream of edits, applies each one to a tree with
//! tiny capacities and to a plain `Vec`, and panics if the contents diverge
//! or a structural check fails.

use afl::fuzz;
use treebuffer::Config;
use treebuffer::TreeBuffer;

#[derive(Debug, Clone, Copy)]
enum FuzzOp {
    Insert { pos_frac: u8, len: u8 },
    Remove { pos_frac: u8, len: u8 },
    Append { len: u8 },
}

impl FuzzOp {
    fn from_bytes(bytes: &[u8]) -> Option<(FuzzOp, &[u8])> {
        if bytes.is_empty() {
            return None;
        }
        let rest = &bytes[1..];
        return match bytes[0] % 3 {
            0 if rest.len() >= 2 => Some((
                FuzzOp::Insert {
                    pos_frac: rest[0],
                    len: (rest[1] % 32).saturating_add(1),
                },
                &rest[2..],
            )),
            1 if rest.len() >= 2 => Some((
                FuzzOp::Remove {
                    pos_frac: rest[0],
                    len: rest[1] % 48,
                },
                &rest[2..],
            )),
            2 if !rest.is_empty() => Some((
                FuzzOp::Append {
                    len: (rest[0] % 32).saturating_add(1),
                },
                &rest[1..],
            )),
            _ => None,
        };
    }
}

fn scale(frac: u8, len: usize) -> usize {
    return (frac as usize * len) / 255;
}

fn run(input: &[u8]) {
    let Some((&shape, mut bytes)) = input.split_first() else {
        return;
    };
    let config = Config::new(1 + (shape % 8) as usize, 3 + (shape >> 4) as usize);
    let mut tree: TreeBuffer<u8> = TreeBuffer::with_config(config);
    let mut model: Vec<u8> = Vec::new();
    let mut counter = 0u8;

    while let Some((op, rest)) = FuzzOp::from_bytes(bytes) {
        bytes = rest;
        match op {
            FuzzOp::Insert { pos_frac, len } => {
                let pos = scale(pos_frac, model.len());
                let data: Vec<u8> = (0..len).map(|i| b'a' + counter.wrapping_add(i) % 26).collect();
                tree.insert(pos, &data).unwrap();
                model.splice(pos..pos, data);
            }
            FuzzOp::Remove { pos_frac, len } => {
                let from = scale(pos_frac, model.len());
                let to = (from + len as usize).min(model.len());
                tree.remove(from, to).unwrap();
                model.drain(from..to);
            }
            FuzzOp::Append { len } => {
                let data: Vec<u8> = (0..len).map(|i| b'A' + counter.wrapping_add(i) % 26).collect();
                tree.append(&data);
                model.extend_from_slice(&data);
            }
        }
        counter = counter.wrapping_add(1);

        if let Err(violation) = tree.check() {
            panic!("{} after {:?}\n{}", violation, op, tree.to_dot());
        }
        assert_eq!(tree.size(), model.len(), "size diverged after {:?}", op);
        assert_eq!(tree.to_vec(), model, "contents diverged after {:?}", op);
    }
}

fn main() {
    fuzz!(|data: &[u8]| {
        run(data);
    });
}
