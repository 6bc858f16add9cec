/*!
Command registry & dispatcher.

Holds the `CommandDescriptor`s registered at startup and exposes a single
entry point, `CommandRegistry::invoke(name, arguments)`:

  1. lookup            -> UnknownCommand
  2. schema validation -> InvalidArgument (handler never called)
  3. robot-address alias resolution on address-typed fields
  4. handler call (single attempt; no timeout, retry or cache here)
  5. result wrapped in the fixed text envelope, or HandlerFailure

The registry is immutable once built and is shared behind an `Arc`; every
invocation is independent and failures never escape as panics.
*/

pub mod envelope;
pub mod schema;

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::{DispatchError, RegistryError};

pub use envelope::Envelope;
pub use schema::{Arguments, FieldSpec, FieldType, InputSchema};

/* ---- Seams ---- */

/// Work bound to a command. Handlers forward to the external SDK.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn call(&self, args: Arguments) -> anyhow::Result<Value>;
}

#[async_trait]
impl<F, Fut> CommandHandler for F
where
    F: Fn(Arguments) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    async fn call(&self, args: Arguments) -> anyhow::Result<Value> {
        (self)(args).await
    }
}

/// Substitutes sentinel address names with concrete addresses.
#[async_trait]
pub trait AddressResolver: Send + Sync {
    async fn resolve(&self, raw: &str) -> anyhow::Result<String>;
}

/* ---- Descriptor ---- */

pub struct CommandDescriptor {
    name: String,
    description: String,
    schema: InputSchema,
    handler: Arc<dyn CommandHandler>,
}

impl CommandDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: InputSchema,
        handler: impl CommandHandler + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schema,
            handler: Arc::new(handler),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn schema(&self) -> &InputSchema {
        &self.schema
    }
}

impl std::fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("fields", &self.schema.fields().len())
            .finish()
    }
}

/* ---- Registry ---- */

#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, CommandDescriptor>,
    resolver: Option<Arc<dyn AddressResolver>>,
}

impl CommandRegistry {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that resolves robot-address aliases through `resolver`.
    /// Without a resolver, alias fields pass through unchanged.
    pub fn with_resolver(resolver: Arc<dyn AddressResolver>) -> Self {
        Self {
            commands: BTreeMap::new(),
            resolver: Some(resolver),
        }
    }

    pub fn register(&mut self, descriptor: CommandDescriptor) -> Result<(), RegistryError> {
        if self.commands.contains_key(descriptor.name()) {
            return Err(RegistryError::DuplicateCommand(descriptor.name));
        }
        debug!(command = %descriptor.name, "registered command");
        self.commands.insert(descriptor.name.clone(), descriptor);
        Ok(())
    }

    /// Descriptors in name order.
    pub fn descriptors(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.commands.values()
    }

    pub fn names(&self) -> Vec<&str> {
        self.commands.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub async fn invoke(
        &self,
        name: &str,
        raw: Map<String, Value>,
    ) -> Result<Envelope, DispatchError> {
        let descriptor = self
            .commands
            .get(name)
            .ok_or_else(|| DispatchError::UnknownCommand(name.to_string()))?;

        let mut args = descriptor.schema.validate(&raw).inspect_err(|e| {
            warn!(command = name, error = %e, "rejected arguments");
        })?;

        self.resolve_aliases(descriptor, &mut args).await?;

        info!(command = name, "dispatching");
        let started = Instant::now();
        match descriptor.handler.call(args).await {
            Ok(value) => {
                debug!(
                    command = name,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "command succeeded"
                );
                Ok(Envelope::json(&value))
            }
            Err(err) => {
                warn!(
                    command = name,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %format!("{err:#}"),
                    "command failed"
                );
                Err(DispatchError::handler_failure(name, &err))
            }
        }
    }

    async fn resolve_aliases(
        &self,
        descriptor: &CommandDescriptor,
        args: &mut Arguments,
    ) -> Result<(), DispatchError> {
        let Some(resolver) = &self.resolver else {
            return Ok(());
        };
        for field in descriptor.schema.alias_fields() {
            let Some(raw) = args.get_str(field).map(str::to_owned) else {
                continue;
            };
            let resolved = resolver
                .resolve(&raw)
                .await
                .map_err(|err| DispatchError::handler_failure(descriptor.name(), &err))?;
            if resolved != raw {
                debug!(command = descriptor.name(), field, "resolved address alias");
                args.replace(field, Value::String(resolved));
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.names())
            .field("resolves_aliases", &self.resolver.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn obj(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    fn echo() -> CommandDescriptor {
        CommandDescriptor::new(
            "echo",
            "Echo arguments back",
            InputSchema::new(vec![
                FieldSpec::required("message", FieldType::String),
                FieldSpec::optional("count", FieldType::Number),
            ]),
            |args: Arguments| async move { Ok::<_, anyhow::Error>(Value::Object(args.to_object())) },
        )
    }

    fn failing() -> CommandDescriptor {
        CommandDescriptor::new(
            "explode",
            "Always fails",
            InputSchema::empty(),
            |_args: Arguments| async move { Err::<Value, _>(anyhow::anyhow!("remote rejected")) },
        )
    }

    struct FixedAlias;

    #[async_trait]
    impl AddressResolver for FixedAlias {
        async fn resolve(&self, raw: &str) -> anyhow::Result<String> {
            Ok(if raw.eq_ignore_ascii_case("alias") {
                "npub_resolved".to_string()
            } else {
                raw.to_string()
            })
        }
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = CommandRegistry::new();
        registry.register(echo()).unwrap();
        let err = registry.register(echo()).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateCommand("echo".into()));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn unknown_command_is_reported() {
        let mut registry = CommandRegistry::new();
        registry.register(echo()).unwrap();
        let err = registry.invoke("nope", Map::new()).await.unwrap_err();
        assert_eq!(err, DispatchError::UnknownCommand("nope".into()));
    }

    #[tokio::test]
    async fn invalid_arguments_never_reach_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut registry = CommandRegistry::new();
        registry
            .register(CommandDescriptor::new(
                "counted",
                "",
                InputSchema::new(vec![FieldSpec::required("orderId", FieldType::String)]),
                move |_args: Arguments| {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Ok::<_, anyhow::Error>(Value::Null)
                    }
                },
            ))
            .unwrap();

        let err = registry.invoke("counted", Map::new()).await.unwrap_err();
        assert!(matches!(
            err,
            DispatchError::InvalidArgument { ref field, .. } if field == "orderId"
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        registry
            .invoke("counted", obj(json!({"orderId": "o-1"})))
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn success_is_wrapped_in_text_envelope() {
        let mut registry = CommandRegistry::new();
        registry.register(echo()).unwrap();
        let env = registry
            .invoke("echo", obj(json!({"message": "hi"})))
            .await
            .unwrap();
        let parsed: Value = serde_json::from_str(env.first_text().unwrap()).unwrap();
        assert_eq!(parsed, json!({"message": "hi"}));
    }

    #[tokio::test]
    async fn handler_failure_is_isolated() {
        let mut registry = CommandRegistry::new();
        registry.register(echo()).unwrap();
        registry.register(failing()).unwrap();

        let err = registry.invoke("explode", Map::new()).await.unwrap_err();
        match err {
            DispatchError::HandlerFailure {
                command, message, ..
            } => {
                assert_eq!(command, "explode");
                assert!(message.contains("remote rejected"));
            }
            other => panic!("unexpected: {other:?}"),
        }

        let env = registry
            .invoke("echo", obj(json!({"message": "still alive"})))
            .await
            .unwrap();
        assert!(env.first_text().unwrap().contains("still alive"));
    }

    #[tokio::test]
    async fn alias_fields_go_through_resolver() {
        let mut registry = CommandRegistry::with_resolver(Arc::new(FixedAlias));
        registry
            .register(CommandDescriptor::new(
                "approve",
                "",
                InputSchema::new(vec![
                    FieldSpec::required("approveTo", FieldType::String).address(),
                    FieldSpec::required("memo", FieldType::String),
                ]),
                |args: Arguments| async move { Ok::<_, anyhow::Error>(Value::Object(args.to_object())) },
            ))
            .unwrap();

        let env = registry
            .invoke("approve", obj(json!({"approveTo": "ALIAS", "memo": "alias"})))
            .await
            .unwrap();
        let parsed: Value = serde_json::from_str(env.first_text().unwrap()).unwrap();
        assert_eq!(parsed, json!({"approveTo": "npub_resolved", "memo": "alias"}));
    }

    #[test]
    fn descriptors_are_listed_in_name_order() {
        let mut registry = CommandRegistry::new();
        registry.register(failing()).unwrap();
        registry.register(echo()).unwrap();
        assert_eq!(registry.names(), vec!["echo", "explode"]);
        assert!(!registry.is_empty());
    }
}
