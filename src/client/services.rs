use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::{ApiRequest, VillaClient};
use crate::model::{
    ApiResponse, PatchOperation, VillaCreateDto, VillaDto, VillaNumberCreateDto, VillaNumberDto,
    VillaNumberUpdateDto, VillaUpdateDto,
};

const VILLAS: &str = "/api/villas";
const VILLA_NUMBERS: &str = "/api/villa-numbers";

async fn send_with_body<T, B>(client: &VillaClient, request: ApiRequest, body: &B) -> ApiResponse<T>
where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
{
    match request.with_body(body) {
        Ok(request) => client.send(request).await,
        Err(e) => e.into(),
    }
}

/// Villa operations for a presentation layer.
#[derive(Debug, Clone)]
pub struct VillaService {
    client: VillaClient,
}

impl VillaService {
    pub fn new(client: VillaClient) -> Self {
        Self { client }
    }

    pub async fn get_all(&self) -> ApiResponse<Vec<VillaDto>> {
        self.client.send(ApiRequest::get(self.client.url(VILLAS))).await
    }

    pub async fn get(&self, id: i32) -> ApiResponse<VillaDto> {
        let url = self.client.url(&format!("{}/{}", VILLAS, id));
        self.client.send(ApiRequest::get(url)).await
    }

    pub async fn create(&self, villa: &VillaCreateDto) -> ApiResponse<VillaDto> {
        let request = ApiRequest::post(self.client.url(VILLAS));
        send_with_body(&self.client, request, villa).await
    }

    pub async fn update(&self, villa: &VillaUpdateDto) -> ApiResponse<()> {
        let request = ApiRequest::put(self.client.url(&format!("{}/{}", VILLAS, villa.id)));
        send_with_body(&self.client, request, villa).await
    }

    pub async fn patch(&self, id: i32, operations: &[PatchOperation]) -> ApiResponse<()> {
        let request = ApiRequest::patch(self.client.url(&format!("{}/{}", VILLAS, id)));
        send_with_body(&self.client, request, operations).await
    }

    pub async fn delete(&self, id: i32) -> ApiResponse<()> {
        let url = self.client.url(&format!("{}/{}", VILLAS, id));
        self.client.send(ApiRequest::delete(url)).await
    }
}

/// Villa number operations for a presentation layer.
#[derive(Debug, Clone)]
pub struct VillaNumberService {
    client: VillaClient,
}

impl VillaNumberService {
    pub fn new(client: VillaClient) -> Self {
        Self { client }
    }

    /// Every villa number; `include_villa` embeds the owning villa.
    pub async fn get_all(&self, include_villa: bool) -> ApiResponse<Vec<VillaNumberDto>> {
        let mut path = VILLA_NUMBERS.to_string();
        if include_villa {
            path.push_str("?include=villa");
        }
        self.client.send(ApiRequest::get(self.client.url(&path))).await
    }

    pub async fn get(&self, villa_no: i32, include_villa: bool) -> ApiResponse<VillaNumberDto> {
        let mut path = format!("{}/{}", VILLA_NUMBERS, villa_no);
        if include_villa {
            path.push_str("?include=villa");
        }
        self.client.send(ApiRequest::get(self.client.url(&path))).await
    }

    pub async fn create(&self, number: &VillaNumberCreateDto) -> ApiResponse<VillaNumberDto> {
        let request = ApiRequest::post(self.client.url(VILLA_NUMBERS));
        send_with_body(&self.client, request, number).await
    }

    pub async fn update(&self, number: &VillaNumberUpdateDto) -> ApiResponse<()> {
        let url = self
            .client
            .url(&format!("{}/{}", VILLA_NUMBERS, number.villa_no));
        send_with_body(&self.client, ApiRequest::put(url), number).await
    }

    pub async fn patch(&self, villa_no: i32, operations: &[PatchOperation]) -> ApiResponse<()> {
        let url = self.client.url(&format!("{}/{}", VILLA_NUMBERS, villa_no));
        send_with_body(&self.client, ApiRequest::patch(url), operations).await
    }

    pub async fn delete(&self, villa_no: i32) -> ApiResponse<()> {
        let url = self.client.url(&format!("{}/{}", VILLA_NUMBERS, villa_no));
        self.client.send(ApiRequest::delete(url)).await
    }
}
