//! Display names for types, representations and signatures.
//!
//! These strings appear in diagnostics and in `Method` displays, so they
//! follow the source syntax: `pkg.Name`, `*T`, `[]T`, `func(A, B) (C, D)`.

use crate::decl::{Signature, TypeData};
use crate::repr::{FuncRepr, ReprKind};
use crate::{ReprId, TypeId, TypeUniverse};

impl TypeUniverse {
    /// Source-syntax name of a static type.
    pub fn type_name(&self, ty: TypeId) -> String {
        let mut out = String::new();
        self.write_type(&mut out, ty);
        out
    }

    fn write_type(&self, out: &mut String, ty: TypeId) {
        match self.data(ty) {
            TypeData::Basic(basic) => out.push_str(basic.name()),
            TypeData::Named(named) => {
                if let Some(pkg) = named.pkg {
                    out.push_str(self.interner().lookup(pkg));
                    out.push('.');
                }
                out.push_str(self.interner().lookup(named.name));
            }
            TypeData::Pointer(elem) => {
                out.push('*');
                self.write_type(out, *elem);
            }
            TypeData::Slice(elem) => {
                out.push_str("[]");
                self.write_type(out, *elem);
            }
            TypeData::Func(sig) => {
                out.push_str("func");
                self.write_signature(out, sig);
            }
            TypeData::Struct(fields) => {
                out.push_str("struct{");
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        out.push_str("; ");
                    }
                    if !field.embedded {
                        out.push_str(self.interner().lookup(field.name));
                        out.push(' ');
                    }
                    self.write_type(out, field.ty);
                }
                out.push('}');
            }
            TypeData::Interface(iface) => {
                out.push_str("interface{");
                let mut first = true;
                for &embedded in &iface.embedded {
                    if !first {
                        out.push_str("; ");
                    }
                    first = false;
                    self.write_type(out, embedded);
                }
                for method in &iface.explicit {
                    if !first {
                        out.push_str("; ");
                    }
                    first = false;
                    out.push_str(self.interner().lookup(method.name));
                    self.write_signature(out, &method.sig);
                }
                out.push('}');
            }
        }
    }

    /// `func(params) results` for a declared signature, receiver omitted.
    pub fn signature_string(&self, sig: &Signature) -> String {
        let mut out = String::from("func");
        self.write_signature(&mut out, sig);
        out
    }

    fn write_signature(&self, out: &mut String, sig: &Signature) {
        out.push('(');
        for (i, &param) in sig.params.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            if sig.variadic && i + 1 == sig.params.len() {
                out.push_str("...");
                self.write_type(out, self.variadic_elem(param));
            } else {
                self.write_type(out, param);
            }
        }
        out.push(')');
        write_results(out, &sig.results, |out, &r| self.write_type(out, r));
    }

    fn variadic_elem(&self, param: TypeId) -> TypeId {
        match self.data(param) {
            TypeData::Slice(elem) => *elem,
            _ => param,
        }
    }

    /// Display name of a runtime representation.
    pub fn repr_name(&self, repr: ReprId) -> String {
        let mut out = String::new();
        self.write_repr(&mut out, repr, true);
        out
    }

    /// `func(params) results` for a runtime function view.
    pub fn func_repr_string(&self, func: &FuncRepr) -> String {
        let mut out = String::from("func");
        self.write_func_repr(&mut out, func);
        out
    }

    fn write_repr(&self, out: &mut String, repr: ReprId, top: bool) {
        let data = self.repr(repr);
        // Names stop the expansion of self-referential representations.
        if let Some(name) = &data.name {
            if !top || !matches!(data.kind, ReprKind::Struct(_)) {
                out.push_str(name);
                return;
            }
        }
        match &data.kind {
            ReprKind::Invalid => out.push_str("<invalid>"),
            ReprKind::Basic(basic) => out.push_str(basic.name()),
            ReprKind::InterfaceHeader => out.push_str("InterfaceHeader"),
            ReprKind::Pointer(elem) => {
                out.push('*');
                self.write_repr(out, *elem, false);
            }
            ReprKind::Slice(elem) => {
                out.push_str("[]");
                self.write_repr(out, *elem, false);
            }
            ReprKind::Array { len, elem } => {
                out.push('[');
                out.push_str(&len.to_string());
                out.push(']');
                self.write_repr(out, *elem, false);
            }
            ReprKind::Func(func) => {
                out.push_str("func");
                self.write_func_repr(out, func);
            }
            ReprKind::Struct(fields) => {
                out.push_str("struct{");
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        out.push_str("; ");
                    }
                    if !field.embedded {
                        out.push_str(self.interner().lookup(field.name));
                        out.push(' ');
                    }
                    self.write_repr(out, field.repr, false);
                }
                out.push('}');
            }
            ReprKind::Interface(methods) => {
                out.push_str("interface{");
                for (i, method) in methods.iter().enumerate() {
                    if i > 0 {
                        out.push_str("; ");
                    }
                    out.push_str(self.interner().lookup(method.name));
                    self.write_func_repr(out, &method.ty);
                }
                out.push('}');
            }
        }
    }

    fn write_func_repr(&self, out: &mut String, func: &FuncRepr) {
        out.push('(');
        for (i, &param) in func.params.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            if func.variadic && i + 1 == func.params.len() {
                out.push_str("...");
                if let ReprKind::Slice(elem) = self.repr(param).kind {
                    self.write_repr(out, elem, false);
                    continue;
                }
            }
            self.write_repr(out, param, false);
        }
        out.push(')');
        write_results(out, &func.results, |out, &r| self.write_repr(out, r, false));
    }
}

fn write_results<T>(out: &mut String, results: &[T], mut write: impl FnMut(&mut String, &T)) {
    match results {
        [] => {}
        [single] => {
            out.push(' ');
            write(out, single);
        }
        many => {
            out.push_str(" (");
            for (i, r) in many.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write(out, r);
            }
            out.push(')');
        }
    }
}
