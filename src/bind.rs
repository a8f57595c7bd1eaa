//! Runtime binding registry: the narrow read/write/call contract through
//! which host objects expose themselves as document nodes.
//!
//! Bindings are registered per host at runtime as closures; the document
//! side only ever sees [`Value`]s. A field binding can snapshot into and
//! restore from an object node; a method binding is invoked with an array
//! of positional arguments and returns a value.

use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::error::TypeError;
use crate::value::{Array, Object, Value};

/// Process-wide registry identifier counter. The only global state in the
/// crate; initialized lazily on first registry construction.
static NEXT_REGISTRY_ID: Lazy<AtomicU64> = Lazy::new(|| AtomicU64::new(1));

/// Produces the current value of a field as a document node.
pub type ReadFn = Box<dyn Fn() -> Value>;

/// Writes a document node back into a field. A node of the wrong shape
/// fails with a `TypeError`.
pub type WriteFn = Box<dyn FnMut(&Value) -> Result<(), TypeError>>;

/// Invokes a bound procedure with positional arguments.
pub type CallFn = Box<dyn FnMut(&Array) -> Result<Value, TypeError>>;

struct Field {
    read: ReadFn,
    write: WriteFn,
}

struct Method {
    arity: usize,
    call: CallFn,
}

/// Named read/write/call bindings for one host object.
///
/// Fields and methods live in separate tables; registration order is
/// preserved for iteration, while snapshots come out key-ordered like any
/// other object node.
pub struct Registry {
    id: u64,
    fields: IndexMap<String, Field>,
    methods: IndexMap<String, Method>,
}

impl Registry {
    pub fn new() -> Self {
        Registry {
            id: NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed),
            fields: IndexMap::new(),
            methods: IndexMap::new(),
        }
    }

    /// Unique, monotonically increasing identifier of this registry.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Registers a field binding. A later registration under the same name
    /// replaces the earlier one.
    pub fn field(&mut self, name: impl Into<String>, read: ReadFn, write: WriteFn) -> &mut Self {
        self.fields.insert(name.into(), Field { read, write });
        self
    }

    /// Registers a method binding with a fixed argument count.
    pub fn method(&mut self, name: impl Into<String>, arity: usize, call: CallFn) -> &mut Self {
        self.methods.insert(name.into(), Method { arity, call });
        self
    }

    /// Names of the registered fields, in registration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Names of the registered methods, in registration order.
    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    /// Reads one field as a document node. `None` for an unknown name.
    pub fn read(&self, name: &str) -> Option<Value> {
        self.fields.get(name).map(|field| (field.read)())
    }

    /// Writes one field from a document node. `Ok(false)` for an unknown
    /// name; the shape check is up to the binding itself.
    pub fn write(&mut self, name: &str, value: &Value) -> Result<bool, TypeError> {
        match self.fields.get_mut(name) {
            Some(field) => {
                (field.write)(value)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Reads every field into an object node keyed by binding name.
    pub fn snapshot(&self) -> Value {
        let mut entries = Object::new();
        for (name, field) in &self.fields {
            entries.insert(name.as_bytes().to_vec(), (field.read)());
        }
        Value::Object(entries)
    }

    /// Writes fields from an object node. A key missing from the source
    /// leaves that field untouched; extra keys in the source are ignored.
    pub fn restore(&mut self, source: &Value) -> Result<(), TypeError> {
        let entries = source.as_object()?;
        for (name, field) in &mut self.fields {
            if let Some(value) = entries.get(name.as_bytes()) {
                (field.write)(value)?;
            }
        }
        Ok(())
    }

    /// Invokes a bound method with positional arguments. The argument count
    /// is checked against the registered arity before the binding runs.
    pub fn call(&mut self, name: &str, args: &Array) -> Result<Value, TypeError> {
        let method = self
            .methods
            .get_mut(name)
            .ok_or(TypeError::Message("No such method."))?;
        if args.len() != method.arity {
            return Err(TypeError::Arity {
                expected: method.arity,
                got: args.len(),
            });
        }
        (method.call)(args)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Kind;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Host {
        name: Vec<u8>,
        count: f64,
        enabled: bool,
    }

    fn bind_host(host: &Rc<RefCell<Host>>) -> Registry {
        let mut registry = Registry::new();

        let h = Rc::clone(host);
        let hw = Rc::clone(host);
        registry.field(
            "name",
            Box::new(move || Value::String(h.borrow().name.clone())),
            Box::new(move |v| {
                hw.borrow_mut().name = v.as_string()?.to_vec();
                Ok(())
            }),
        );

        let h = Rc::clone(host);
        let hw = Rc::clone(host);
        registry.field(
            "count",
            Box::new(move || Value::Number(h.borrow().count)),
            Box::new(move |v| {
                hw.borrow_mut().count = v.as_number()?;
                Ok(())
            }),
        );

        let h = Rc::clone(host);
        let hw = Rc::clone(host);
        registry.field(
            "enabled",
            Box::new(move || Value::Boolean(h.borrow().enabled)),
            Box::new(move |v| {
                hw.borrow_mut().enabled = v.as_boolean()?;
                Ok(())
            }),
        );

        let h = Rc::clone(host);
        registry.method(
            "add",
            2,
            Box::new(move |args| {
                let sum = args[0].as_number()? + args[1].as_number()?;
                h.borrow_mut().count = sum;
                Ok(Value::Number(sum))
            }),
        );

        registry
    }

    #[test]
    fn test_ids_are_monotonic() {
        let a = Registry::new();
        let b = Registry::new();
        assert!(b.id() > a.id());
    }

    #[test]
    fn test_read_and_write_single_field() {
        let host = Rc::new(RefCell::new(Host::default()));
        host.borrow_mut().count = 7.0;
        let mut registry = bind_host(&host);

        assert_eq!(registry.read("count"), Some(Value::Number(7.0)));
        assert_eq!(registry.read("missing"), None);

        assert!(registry.write("count", &Value::Number(9.0)).unwrap());
        assert_eq!(host.borrow().count, 9.0);
        assert!(!registry.write("missing", &Value::Null).unwrap());
    }

    #[test]
    fn test_write_wrong_shape() {
        let host = Rc::new(RefCell::new(Host::default()));
        let mut registry = bind_host(&host);

        let err = registry.write("count", &Value::from("nope")).unwrap_err();
        assert_eq!(err, TypeError::Expected(Kind::Number));
    }

    #[test]
    fn test_snapshot_is_key_ordered_object() {
        let host = Rc::new(RefCell::new(Host {
            name: b"probe".to_vec(),
            count: 3.0,
            enabled: true,
        }));
        let registry = bind_host(&host);

        let snapshot = registry.snapshot();
        assert_eq!(
            crate::serializer::to_string(&snapshot, false),
            "{ \"count\": 3, \"enabled\": true, \"name\": \"probe\" }"
        );
    }

    #[test]
    fn test_restore_missing_key_leaves_default() {
        let host = Rc::new(RefCell::new(Host::default()));
        host.borrow_mut().count = 42.0;
        let mut registry = bind_host(&host);

        let source = crate::parser::from_str(r#"{"name": "set", "extra": 1}"#).unwrap();
        registry.restore(&source).unwrap();

        assert_eq!(host.borrow().name, b"set");
        // "count" was absent from the source, so it keeps its value.
        assert_eq!(host.borrow().count, 42.0);
    }

    #[test]
    fn test_restore_requires_object() {
        let host = Rc::new(RefCell::new(Host::default()));
        let mut registry = bind_host(&host);

        let err = registry.restore(&Value::Number(1.0)).unwrap_err();
        assert_eq!(err, TypeError::Expected(Kind::Object));
    }

    #[test]
    fn test_call() {
        let host = Rc::new(RefCell::new(Host::default()));
        let mut registry = bind_host(&host);

        let args = vec![Value::Number(2.0), Value::Number(3.0)];
        assert_eq!(registry.call("add", &args).unwrap(), Value::Number(5.0));
        assert_eq!(host.borrow().count, 5.0);
    }

    #[test]
    fn test_call_arity_distinct_from_shape_error() {
        let host = Rc::new(RefCell::new(Host::default()));
        let mut registry = bind_host(&host);

        // Wrong count: arity error, before the binding runs.
        let short = vec![Value::Number(1.0)];
        let err = registry.call("add", &short).unwrap_err();
        assert_eq!(err, TypeError::Arity { expected: 2, got: 1 });

        // Right count, wrong shape: the binding's own type error.
        let args = vec![Value::Number(1.0), Value::from("two")];
        let err = registry.call("add", &args).unwrap_err();
        assert_eq!(err, TypeError::Expected(Kind::Number));
    }

    #[test]
    fn test_call_unknown_method() {
        let host = Rc::new(RefCell::new(Host::default()));
        let mut registry = bind_host(&host);
        let err = registry.call("nope", &Array::new()).unwrap_err();
        assert_eq!(err, TypeError::Message("No such method."));
    }

    #[test]
    fn test_registration_order_preserved() {
        let host = Rc::new(RefCell::new(Host::default()));
        let registry = bind_host(&host);
        let names: Vec<&str> = registry.field_names().collect();
        assert_eq!(names, ["name", "count", "enabled"]);
        let methods: Vec<&str> = registry.method_names().collect();
        assert_eq!(methods, ["add"]);
    }
}
