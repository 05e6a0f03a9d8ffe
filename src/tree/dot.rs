//! Rendering: Graphviz export, the `Debug` shape dump and `Display`.

use std::fmt;
use std::fmt::Write;

use super::TreeBuffer;
use super::arena::NONE;
use super::node::NodeRef;

impl<T> TreeBuffer<T> {
    /// Render the tree as a Graphviz digraph.
    ///
    /// Inner nodes are folders labelled with offset and size, leaves are
    /// boxes, black edges point from child to parent and red edges follow
    /// the leaf chain. Nodes of one level share a rank.
    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        out.push_str("digraph {\n");
        out.push_str("node [ fontname=\"Liberation Sans\" ];\n");
        out.push_str("rankdir=TB;\n");
        if self.root == NONE {
            out.push_str("}\n");
            return out;
        }

        let mut level = vec![NodeRef::Inner(self.root)];
        while !level.is_empty() {
            let mut below = Vec::new();
            for &node in level.iter() {
                self.dot_node(node, &mut out);
                if let NodeRef::Inner(idx) = node {
                    below.extend(self.inners[idx].children.iter().copied());
                }
            }
            out.push_str("{ rank=same;");
            for &node in level.iter() {
                let _ = write!(out, " {};", dot_name(node));
            }
            out.push_str(" }\n");
            level = below;
        }
        out.push_str("}\n");
        return out;
    }

    fn dot_node(&self, node: NodeRef, out: &mut String) {
        let name = dot_name(node);
        match node {
            NodeRef::Inner(idx) => {
                let inner = &self.inners[idx];
                let _ = writeln!(
                    out,
                    "{} [shape=folder, color=grey, label=\"inner#{}\\noffset={}, size={}\"];",
                    name, idx, inner.offset, inner.size
                );
                if inner.parent != NONE {
                    let _ = writeln!(out, "{} -> {};", name, dot_name(NodeRef::Inner(inner.parent)));
                }
            }
            NodeRef::Leaf(idx) => {
                let leaf = &self.leaves[idx];
                let _ = writeln!(
                    out,
                    "{} [shape=box3d, label=\"leaf#{}\\noffset={}\\nsize={}\"];",
                    name,
                    idx,
                    leaf.offset,
                    leaf.len()
                );
                let _ = writeln!(out, "{} -> {};", name, dot_name(NodeRef::Inner(leaf.parent)));
                if leaf.next != NONE {
                    let _ = writeln!(out, "{} -> {} [color=red];", name, dot_name(NodeRef::Leaf(leaf.next)));
                }
            }
        }
    }

    /// Nested `[offset+size: ...]` rendering of the node shapes.
    fn write_shape(&self, node: NodeRef, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        match node {
            NodeRef::Leaf(idx) => {
                let leaf = &self.leaves[idx];
                return write!(out, "({}+{})", leaf.offset, leaf.len());
            }
            NodeRef::Inner(idx) => {
                let inner = &self.inners[idx];
                write!(out, "[{}+{}:", inner.offset, inner.size)?;
                for &child in inner.children.iter() {
                    write!(out, " ")?;
                    self.write_shape(child, out)?;
                }
                return write!(out, "]");
            }
        }
    }
}

fn dot_name(node: NodeRef) -> String {
    return match node {
        NodeRef::Leaf(idx) => format!("leaf{}", idx),
        NodeRef::Inner(idx) => format!("inner{}", idx),
    };
}

impl<T> fmt::Debug for TreeBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TreeBuffer {{ size: {}, shape: ", self.size())?;
        if self.root == NONE {
            write!(f, "[]")?;
        } else {
            self.write_shape(NodeRef::Inner(self.root), f)?;
        }
        return write!(f, " }}");
    }
}

impl<T: fmt::Display> fmt::Display for TreeBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in self.iter() {
            write!(f, "{}", item)?;
        }
        return Ok(());
    }
}

impl TreeBuffer<u8> {
    /// The contents decoded as UTF-8, with invalid sequences replaced.
    pub fn to_string_lossy(&self) -> String {
        return String::from_utf8_lossy(&self.to_vec()).into_owned();
    }
}
