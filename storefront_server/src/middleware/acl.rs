//! Access control middleware.
//!
//! Wraps a route so that it is only reachable by users holding every one of the required roles. The caller is
//! identified from their identity token, and their role is read from the user store through `AuthApi<A>`, which must be
//! registered as app data. Unknown users get a 404, users without the role a 403.
use std::{
    future::{ready, Ready},
    marker::PhantomData,
    rc::Rc,
};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web,
    Error,
};
use futures::future::LocalBoxFuture;
use log::*;
use storefront_engine::{db_types::Role, traits::UserManagement, AuthApi};

use crate::{auth::IdentityClaims, errors::ServerError};

pub struct AclMiddlewareFactory<A> {
    required_roles: Vec<Role>,
    _backend: PhantomData<fn() -> A>,
}

impl<A> AclMiddlewareFactory<A> {
    pub fn new(required_roles: &[Role]) -> Self {
        AclMiddlewareFactory { required_roles: required_roles.to_vec(), _backend: PhantomData }
    }
}

impl<S, B, A> Transform<S, ServiceRequest> for AclMiddlewareFactory<A>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    A: UserManagement + 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = AclMiddlewareService<S, A>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AclMiddlewareService {
            required_roles: self.required_roles.clone(),
            service: Rc::new(service),
            _backend: PhantomData,
        }))
    }
}

pub struct AclMiddlewareService<S, A> {
    required_roles: Vec<Role>,
    service: Rc<S>,
    _backend: PhantomData<fn() -> A>,
}

impl<S, B, A> Service<ServiceRequest> for AclMiddlewareService<S, A>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    A: UserManagement + 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let required_roles = self.required_roles.clone();
        Box::pin(async move {
            let claims = req.extract::<IdentityClaims>().await?;
            let api = req.app_data::<web::Data<AuthApi<A>>>().cloned().ok_or_else(|| {
                error!("🔐️ AuthApi has not been registered with the server");
                ServerError::ConfigurationError("Roles cannot be checked".into())
            })?;
            for role in required_roles {
                api.check_role(&claims.uid, role).await.map_err(|e| {
                    info!("🔐️ {} was denied access to {}. {e}", claims.uid, req.path());
                    ServerError::from(e)
                })?;
            }
            trace!("🔐️ {} may access {}", claims.uid, req.path());
            service.call(req).await
        })
    }
}
