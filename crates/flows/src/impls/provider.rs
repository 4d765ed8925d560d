use crate::{ChainReader, Confirmation, ReadError, Writer};
use alloy::{
    network::{Network, ReceiptResponse, TransactionBuilder},
    primitives::{Address, Bytes, TxHash},
    providers::{
        fillers::{FillProvider, TxFiller},
        PendingTransactionBuilder, PendingTransactionError, Provider,
    },
};

impl<F, P, N> ChainReader for FillProvider<F, P, N>
where
    F: TxFiller<N>,
    P: Provider<N>,
    N: Network,
{
    async fn chain_id(&self) -> Result<u64, ReadError> {
        Provider::get_chain_id(self).await.map_err(ReadError::from_rpc)
    }

    async fn call_raw(&self, to: Address, input: Bytes) -> Result<Bytes, ReadError> {
        let tx = N::TransactionRequest::default().with_to(to).with_input(input);
        Provider::call(self, tx).await.map_err(ReadError::from_rpc)
    }
}

impl<F, P, N> Writer for FillProvider<F, P, N>
where
    F: TxFiller<N>,
    P: Provider<N>,
    N: Network,
{
    type Error = PendingTransactionError;

    async fn send(&self, to: Address, input: Bytes) -> Result<TxHash, Self::Error> {
        let tx = N::TransactionRequest::default().with_to(to).with_input(input);
        let pending = Provider::send_transaction(self, tx).await?;
        Ok(*pending.tx_hash())
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<Confirmation, Self::Error> {
        let receipt =
            PendingTransactionBuilder::new(self.root().clone(), tx_hash).get_receipt().await?;
        Ok(Confirmation {
            tx_hash: receipt.transaction_hash(),
            block_number: receipt.block_number(),
            success: receipt.status(),
        })
    }
}
