use crate::meta::FnMeta;
use std::marker::PhantomData;

// ─── Callable ──────────────────────────────────────────────────────────────────

/// A callable with attached metadata.
///
/// Invocation takes `&self`: concurrent calls of the same callable share no
/// mutable state. Arguments and the return value pass through unchanged; a
/// multi-argument callable takes a tuple.
pub trait Callable<A> {
    type Ok;
    type Error;

    /// Metadata of the innermost target this callable forwards to.
    fn metadata(&self) -> &FnMeta;

    /// Mutable access to the innermost target's metadata.
    fn metadata_mut(&mut self) -> &mut FnMeta;

    fn call(&self, args: A) -> Result<Self::Ok, Self::Error>;
}

// ─── Hooks ─────────────────────────────────────────────────────────────────────

/// Behavior injected around a call.
///
/// `before` and `after` are side-effect-only observers of the arguments and
/// the outcome; they must not alter either. `around` receives the forwarding
/// invocation itself and fully controls whether, and how many times, it runs;
/// this is where retry attaches. All three default to pass-through.
///
/// Hooks are infallible functions. A hook that panics unwinds through the
/// whole stack immediately; nothing catches it and no delay or re-attempt
/// logic runs on the way out.
pub trait CallHook<A, T, E>: Send + Sync {
    fn before(&self, meta: &FnMeta, args: &A) {
        let _ = (meta, args);
    }

    fn after(&self, meta: &FnMeta, outcome: &Result<T, E>) {
        let _ = (meta, outcome);
    }

    fn around(&self, meta: &FnMeta, next: &mut dyn FnMut() -> Result<T, E>) -> Result<T, E> {
        let _ = meta;
        next()
    }
}

struct BeforeFn<F>(F);

impl<A, T, E, F> CallHook<A, T, E> for BeforeFn<F>
where
    F: Fn(&FnMeta, &A) + Send + Sync,
{
    fn before(&self, meta: &FnMeta, args: &A) {
        (self.0)(meta, args)
    }
}

struct AfterFn<F>(F);

impl<A, T, E, F> CallHook<A, T, E> for AfterFn<F>
where
    F: Fn(&FnMeta, &Result<T, E>) + Send + Sync,
{
    fn after(&self, meta: &FnMeta, outcome: &Result<T, E>) {
        (self.0)(meta, outcome)
    }
}

struct AroundFn<F>(F);

impl<A, T, E, F> CallHook<A, T, E> for AroundFn<F>
where
    F: Fn(&FnMeta, &mut dyn FnMut() -> Result<T, E>) -> Result<T, E> + Send + Sync,
{
    fn around(&self, meta: &FnMeta, next: &mut dyn FnMut() -> Result<T, E>) -> Result<T, E> {
        (self.0)(meta, next)
    }
}

// ─── Target ────────────────────────────────────────────────────────────────────

/// Adapts a plain function into a [`Callable`] with explicit metadata.
pub struct Target<F, A, T, E> {
    meta: FnMeta,
    f: F,
    _call: PhantomData<fn(A) -> Result<T, E>>,
}

impl<F, A, T, E> Target<F, A, T, E>
where
    F: Fn(A) -> Result<T, E>,
{
    pub fn new(meta: FnMeta, f: F) -> Self {
        Self {
            meta,
            f,
            _call: PhantomData,
        }
    }
}

impl<F, A, T, E> Callable<A> for Target<F, A, T, E>
where
    F: Fn(A) -> Result<T, E>,
{
    type Ok = T;
    type Error = E;

    fn metadata(&self) -> &FnMeta {
        &self.meta
    }

    fn metadata_mut(&mut self) -> &mut FnMeta {
        &mut self.meta
    }

    fn call(&self, args: A) -> Result<T, E> {
        (self.f)(args)
    }
}

// ─── Wrapped ───────────────────────────────────────────────────────────────────

/// A callable wrapped with an ordered pipeline of hooks.
///
/// Hooks added later sit further out: for each call, layer k runs its own
/// `before`, then its `around` over everything beneath it, then its `after`
/// on the outcome. An `around` that re-invokes its continuation re-runs all
/// inner layers, so a logging hook stacked inside a retry hook logs every
/// attempt while one stacked outside logs once per call.
///
/// A `Wrapped` is itself a [`Callable`], so wrapping an already-wrapped
/// callable composes the same way, and metadata accessors delegate through
/// every layer to the innermost target.
///
/// # Example
/// ```ignore
/// let fetch = wrap(
///     FnMeta::new("fetch_rates").with_doc("Fetch spot rates for a region"),
///     |region: String| client.rates(&region),
/// )
/// .with_retry(RetryPolicy::default())
/// .with_timing();
///
/// let rates = fetch.call("eu-west".to_string())?;
/// assert_eq!(fetch.metadata().name(), "fetch_rates");
/// ```
pub struct Wrapped<C, A>
where
    C: Callable<A>,
{
    inner: C,
    hooks: Vec<Box<dyn CallHook<A, C::Ok, C::Error>>>,
}

/// Wrap a plain function with the given metadata.
///
/// The entry point of the construction primitive: the returned [`Wrapped`]
/// forwards arguments and result unchanged until hooks are layered on.
pub fn wrap<F, A, T, E>(meta: FnMeta, f: F) -> Wrapped<Target<F, A, T, E>, A>
where
    F: Fn(A) -> Result<T, E>,
{
    Wrapped::over(Target::new(meta, f))
}

impl<C, A> Wrapped<C, A>
where
    C: Callable<A>,
{
    /// Wrap an existing callable, possibly already wrapped. Metadata passes
    /// through to the innermost target.
    pub fn over(inner: C) -> Self {
        Self {
            inner,
            hooks: Vec::new(),
        }
    }

    /// Append `hook` to the pipeline. The newest hook is the outermost.
    pub fn layer<H>(mut self, hook: H) -> Self
    where
        H: CallHook<A, C::Ok, C::Error> + 'static,
    {
        self.hooks.push(Box::new(hook));
        self
    }

    /// Observe the arguments before the layers beneath run.
    pub fn with_before<F>(self, f: F) -> Self
    where
        F: Fn(&FnMeta, &A) + Send + Sync + 'static,
    {
        self.layer(BeforeFn(f))
    }

    /// Observe the outcome after the layers beneath have run.
    pub fn with_after<F>(self, f: F) -> Self
    where
        F: Fn(&FnMeta, &Result<C::Ok, C::Error>) + Send + Sync + 'static,
    {
        self.layer(AfterFn(f))
    }

    /// Take control of the forwarding invocation itself.
    pub fn with_around<F>(self, f: F) -> Self
    where
        F: Fn(&FnMeta, &mut dyn FnMut() -> Result<C::Ok, C::Error>) -> Result<C::Ok, C::Error>
            + Send
            + Sync
            + 'static,
    {
        self.layer(AroundFn(f))
    }

    /// Rewrite the target's documentation by filling `{name}` placeholders.
    /// Runs once, at construction.
    pub fn fill_doc(mut self, values: &[(&str, String)]) -> Self {
        self.inner.metadata_mut().fill_doc(values);
        self
    }
}

impl<C, A> Wrapped<C, A>
where
    C: Callable<A>,
    A: Clone,
{
    fn run_layer(&self, layer: usize, args: &A) -> Result<C::Ok, C::Error> {
        let Some(idx) = layer.checked_sub(1) else {
            // innermost: forward a fresh clone so an outer `around` can
            // re-invoke with the original arguments
            return self.inner.call(args.clone());
        };
        let hook = &self.hooks[idx];
        let meta = self.inner.metadata();
        hook.before(meta, args);
        let mut next = || self.run_layer(idx, args);
        let outcome = hook.around(meta, &mut next);
        hook.after(meta, &outcome);
        outcome
    }
}

impl<C, A> Callable<A> for Wrapped<C, A>
where
    C: Callable<A>,
    A: Clone,
{
    type Ok = C::Ok;
    type Error = C::Error;

    fn metadata(&self) -> &FnMeta {
        self.inner.metadata()
    }

    fn metadata_mut(&mut self) -> &mut FnMeta {
        self.inner.metadata_mut()
    }

    fn call(&self, args: A) -> Result<C::Ok, C::Error> {
        self.run_layer(self.hooks.len(), &args)
    }
}
